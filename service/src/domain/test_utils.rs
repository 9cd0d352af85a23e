use std::sync::{Arc, Mutex};

use canal_common::{PublicationStatus, Resolution, Slug, Title};
use chrono::{DateTime, Utc};

use crate::domain::content::{
    Article, ArticleFilter, ArticleId, ArticleUpdate, Episode, EpisodeId, EpisodeUpdate,
    NewArticle, NewEpisode, NewProgram, Program, ProgramId,
};
use crate::domain::repository::{ContentRepository, RepositoryError};
use crate::domain::sweep::Transitioned;

/// In-memory stand-in for the Postgres repository. The `publish_due_*`
/// methods perform the same conditional check-and-set under one lock that
/// the store performs per row, so the sweep properties hold here too.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    articles: Vec<Article>,
    programs: Vec<Program>,
    episodes: Vec<Episode>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

pub fn article_input(slug: &str, publication: Resolution) -> NewArticle {
    NewArticle {
        title: Title::try_new(slug.replace('-', " ")).unwrap(),
        slug: Slug::try_new(slug).unwrap(),
        summary: None,
        body: "cuerpo de la nota".to_owned(),
        image_url: None,
        featured: false,
        publication,
    }
}

pub fn episode_input(program_id: ProgramId, title: &str, publication: Resolution) -> NewEpisode {
    NewEpisode {
        program_id,
        title: Title::try_new(title).unwrap(),
        description: None,
        audio_url: format!("https://cdn.example/{title}.mp3"),
        duration_seconds: Some(1800),
        publication,
    }
}

impl ContentRepository for InMemoryRepository {
    async fn create_article(&self, new: NewArticle) -> Result<Article, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.articles.iter().any(|a| a.slug == new.slug) {
            return Err(RepositoryError::UniqueViolation(format!(
                "slug {} already exists",
                new.slug
            )));
        }
        let now = Utc::now();
        let article = Article {
            id: ArticleId(inner.next_id()),
            title: new.title,
            slug: new.slug,
            summary: new.summary,
            body: new.body,
            image_url: new.image_url,
            featured: new.featured,
            status: new.publication.status,
            publish_at: new.publication.publish_at,
            created_at: now,
            updated_at: now,
        };
        inner.articles.push(article.clone());
        Ok(article)
    }

    async fn update_article(
        &self,
        id: ArticleId,
        update: ArticleUpdate,
    ) -> Result<Article, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let article = inner
            .articles
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(RepositoryError::NotFound)?;
        if let Some(title) = update.title {
            article.title = title;
        }
        if let Some(slug) = update.slug {
            article.slug = slug;
        }
        if let Some(summary) = update.summary {
            article.summary = Some(summary);
        }
        if let Some(body) = update.body {
            article.body = body;
        }
        if let Some(image_url) = update.image_url {
            article.image_url = Some(image_url);
        }
        if let Some(featured) = update.featured {
            article.featured = featured;
        }
        if let Some(publication) = update.publication {
            article.status = publication.status;
            article.publish_at = publication.publish_at;
        }
        article.updated_at = Utc::now();
        Ok(article.clone())
    }

    async fn delete_article(&self, id: ArticleId) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.articles.len();
        inner.articles.retain(|a| a.id != id);
        if inner.articles.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn set_article_status(
        &self,
        id: ArticleId,
        status: PublicationStatus,
    ) -> Result<Article, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let article = inner
            .articles
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(RepositoryError::NotFound)?;
        article.status = status;
        article.updated_at = Utc::now();
        Ok(article.clone())
    }

    async fn find_published_article_by_slug(
        &self,
        slug: &Slug,
    ) -> Result<Option<Article>, RepositoryError> {
        let now = Utc::now();
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .articles
            .iter()
            .find(|a| &a.slug == slug && is_visible(a.status, a.publish_at, now))
            .cloned())
    }

    async fn list_published_articles(
        &self,
        filter: ArticleFilter,
    ) -> Result<Vec<Article>, RepositoryError> {
        let now = Utc::now();
        let inner = self.inner.lock().unwrap();
        let mut articles: Vec<Article> = inner
            .articles
            .iter()
            .filter(|a| is_visible(a.status, a.publish_at, now))
            .filter(|a| filter.featured.is_none_or(|wanted| a.featured == wanted))
            .cloned()
            .collect();
        articles.sort_by(|a, b| b.publish_at.cmp(&a.publish_at));
        Ok(articles
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn publish_due_articles(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Transitioned>, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let mut transitioned = Vec::new();
        for article in inner.articles.iter_mut() {
            if article.status == PublicationStatus::Scheduled
                && article.publish_at.is_some_and(|at| at <= now)
            {
                article.status = PublicationStatus::Published;
                article.updated_at = now;
                transitioned.push(Transitioned {
                    id: article.id.0,
                    title: article.title.to_string(),
                });
            }
        }
        Ok(transitioned)
    }

    async fn create_program(&self, new: NewProgram) -> Result<Program, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.programs.iter().any(|p| p.slug == new.slug) {
            return Err(RepositoryError::UniqueViolation(format!(
                "slug {} already exists",
                new.slug
            )));
        }
        let now = Utc::now();
        let program = Program {
            id: ProgramId(inner.next_id()),
            title: new.title,
            slug: new.slug,
            description: new.description,
            created_at: now,
            updated_at: now,
        };
        inner.programs.push(program.clone());
        Ok(program)
    }

    async fn list_programs(&self) -> Result<Vec<Program>, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        let mut programs = inner.programs.clone();
        programs.sort_by(|a, b| a.title.as_ref().cmp(b.title.as_ref()));
        Ok(programs)
    }

    async fn create_episode(&self, new: NewEpisode) -> Result<Episode, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.programs.iter().any(|p| p.id == new.program_id) {
            return Err(RepositoryError::ValidationFailed(format!(
                "program {} does not exist",
                new.program_id.0
            )));
        }
        let now = Utc::now();
        let episode = Episode {
            id: EpisodeId(inner.next_id()),
            program_id: new.program_id,
            title: new.title,
            description: new.description,
            audio_url: new.audio_url,
            duration_seconds: new.duration_seconds,
            status: new.publication.status,
            publish_at: new.publication.publish_at,
            created_at: now,
            updated_at: now,
        };
        inner.episodes.push(episode.clone());
        Ok(episode)
    }

    async fn update_episode(
        &self,
        id: EpisodeId,
        update: EpisodeUpdate,
    ) -> Result<Episode, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let episode = inner
            .episodes
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(RepositoryError::NotFound)?;
        if let Some(title) = update.title {
            episode.title = title;
        }
        if let Some(description) = update.description {
            episode.description = Some(description);
        }
        if let Some(audio_url) = update.audio_url {
            episode.audio_url = audio_url;
        }
        if let Some(duration_seconds) = update.duration_seconds {
            episode.duration_seconds = Some(duration_seconds);
        }
        if let Some(publication) = update.publication {
            episode.status = publication.status;
            episode.publish_at = publication.publish_at;
        }
        episode.updated_at = Utc::now();
        Ok(episode.clone())
    }

    async fn delete_episode(&self, id: EpisodeId) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.episodes.len();
        inner.episodes.retain(|e| e.id != id);
        if inner.episodes.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn set_episode_status(
        &self,
        id: EpisodeId,
        status: PublicationStatus,
    ) -> Result<Episode, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let episode = inner
            .episodes
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(RepositoryError::NotFound)?;
        episode.status = status;
        episode.updated_at = Utc::now();
        Ok(episode.clone())
    }

    async fn list_published_episodes(
        &self,
        program: Option<ProgramId>,
    ) -> Result<Vec<Episode>, RepositoryError> {
        let now = Utc::now();
        let inner = self.inner.lock().unwrap();
        let mut episodes: Vec<Episode> = inner
            .episodes
            .iter()
            .filter(|e| is_visible(e.status, e.publish_at, now))
            .filter(|e| program.is_none_or(|wanted| e.program_id == wanted))
            .cloned()
            .collect();
        episodes.sort_by(|a, b| b.publish_at.cmp(&a.publish_at));
        Ok(episodes)
    }

    async fn publish_due_episodes(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Transitioned>, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let mut transitioned = Vec::new();
        for episode in inner.episodes.iter_mut() {
            if episode.status == PublicationStatus::Scheduled
                && episode.publish_at.is_some_and(|at| at <= now)
            {
                episode.status = PublicationStatus::Published;
                episode.updated_at = now;
                transitioned.push(Transitioned {
                    id: episode.id.0,
                    title: episode.title.to_string(),
                });
            }
        }
        Ok(transitioned)
    }
}

fn is_visible(
    status: PublicationStatus,
    publish_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    status == PublicationStatus::Published && publish_at.is_some_and(|at| at <= now)
}
