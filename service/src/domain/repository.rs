use canal_common::{PublicationStatus, Slug};
use chrono::{DateTime, Utc};

use crate::domain::content::{
    Article, ArticleFilter, ArticleId, ArticleUpdate, Episode, EpisodeId, EpisodeUpdate,
    NewArticle, NewEpisode, NewProgram, Program, ProgramId,
};
use crate::domain::sweep::Transitioned;

/// Store-facing port for all editor-managed content.
///
/// The `publish_due_*` methods are the sweep's conditional transition: the
/// store only flips rows still in `scheduled`, which is what makes
/// concurrent sweeps commute.
pub trait ContentRepository: Clone + Send + Sync + 'static {
    fn create_article(
        &self,
        new: NewArticle,
    ) -> impl Future<Output = Result<Article, RepositoryError>> + Send;

    fn update_article(
        &self,
        id: ArticleId,
        update: ArticleUpdate,
    ) -> impl Future<Output = Result<Article, RepositoryError>> + Send;

    fn delete_article(
        &self,
        id: ArticleId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Direct editor transition (unpublish, archive).
    fn set_article_status(
        &self,
        id: ArticleId,
        status: PublicationStatus,
    ) -> impl Future<Output = Result<Article, RepositoryError>> + Send;

    fn find_published_article_by_slug(
        &self,
        slug: &Slug,
    ) -> impl Future<Output = Result<Option<Article>, RepositoryError>> + Send;

    fn list_published_articles(
        &self,
        filter: ArticleFilter,
    ) -> impl Future<Output = Result<Vec<Article>, RepositoryError>> + Send;

    fn publish_due_articles(
        &self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Transitioned>, RepositoryError>> + Send;

    fn create_program(
        &self,
        new: NewProgram,
    ) -> impl Future<Output = Result<Program, RepositoryError>> + Send;

    fn list_programs(&self) -> impl Future<Output = Result<Vec<Program>, RepositoryError>> + Send;

    fn create_episode(
        &self,
        new: NewEpisode,
    ) -> impl Future<Output = Result<Episode, RepositoryError>> + Send;

    fn update_episode(
        &self,
        id: EpisodeId,
        update: EpisodeUpdate,
    ) -> impl Future<Output = Result<Episode, RepositoryError>> + Send;

    fn delete_episode(
        &self,
        id: EpisodeId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    fn set_episode_status(
        &self,
        id: EpisodeId,
        status: PublicationStatus,
    ) -> impl Future<Output = Result<Episode, RepositoryError>> + Send;

    fn list_published_episodes(
        &self,
        program: Option<ProgramId>,
    ) -> impl Future<Output = Result<Vec<Episode>, RepositoryError>> + Send;

    fn publish_due_episodes(
        &self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Transitioned>, RepositoryError>> + Send;
}

#[derive(Debug)]
pub enum RepositoryError {
    NotFound,
    ValidationFailed(String),
    UniqueViolation(String),
    DatabaseError(String),
}
