use canal_common::{
    PublicationStatus, Resolution, Slug, Title, parse_civil, resolve_initial_status,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::domain::content::{
    Article, ArticleUpdate, Episode, EpisodeUpdate, NewArticle, NewEpisode, NewProgram, Program,
    ProgramId,
};
use crate::infrastructure::http::api::ApiError;

// Requests. Every endpoint takes an explicit shape; unknown statuses and
// malformed civil times are rejected here, before the store is touched.

#[derive(Debug, Deserialize)]
pub struct CreateArticleRequest {
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub body: String,
    pub image_url: Option<String>,
    pub featured: Option<bool>,
    /// Civil time in the configured zone, `YYYY-MM-DDTHH:MM[:SS]`.
    pub publish_at: Option<String>,
    /// Editor override; omitted means "resolve from publish_at".
    pub status: Option<String>,
}

impl CreateArticleRequest {
    pub fn into_domain(self, tz: Tz, now: DateTime<Utc>) -> Result<NewArticle, ApiError> {
        let publication =
            resolve_publication(self.publish_at.as_deref(), self.status.as_deref(), tz, now)?;
        Ok(NewArticle {
            title: parse_title(self.title)?,
            slug: parse_slug(self.slug)?,
            summary: self.summary,
            body: self.body,
            image_url: self.image_url,
            featured: self.featured.unwrap_or(false),
            publication,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub image_url: Option<String>,
    pub featured: Option<bool>,
    pub publish_at: Option<String>,
    pub status: Option<String>,
}

impl UpdateArticleRequest {
    pub fn into_domain(self, tz: Tz, now: DateTime<Utc>) -> Result<ArticleUpdate, ApiError> {
        // Touching either scheduling field re-resolves both together.
        let publication = if self.publish_at.is_some() || self.status.is_some() {
            Some(resolve_publication(
                self.publish_at.as_deref(),
                self.status.as_deref(),
                tz,
                now,
            )?)
        } else {
            None
        };
        Ok(ArticleUpdate {
            title: self.title.map(parse_title).transpose()?,
            slug: self.slug.map(parse_slug).transpose()?,
            summary: self.summary,
            body: self.body,
            image_url: self.image_url,
            featured: self.featured,
            publication,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProgramRequest {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
}

impl CreateProgramRequest {
    pub fn into_domain(self) -> Result<NewProgram, ApiError> {
        Ok(NewProgram {
            title: parse_title(self.title)?,
            slug: parse_slug(self.slug)?,
            description: self.description,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateEpisodeRequest {
    pub program_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub audio_url: String,
    pub duration_seconds: Option<i32>,
    pub publish_at: Option<String>,
    pub status: Option<String>,
}

impl CreateEpisodeRequest {
    pub fn into_domain(self, tz: Tz, now: DateTime<Utc>) -> Result<NewEpisode, ApiError> {
        let publication =
            resolve_publication(self.publish_at.as_deref(), self.status.as_deref(), tz, now)?;
        Ok(NewEpisode {
            program_id: ProgramId(self.program_id),
            title: parse_title(self.title)?,
            description: self.description,
            audio_url: self.audio_url,
            duration_seconds: self.duration_seconds,
            publication,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateEpisodeRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub audio_url: Option<String>,
    pub duration_seconds: Option<i32>,
    pub publish_at: Option<String>,
    pub status: Option<String>,
}

impl UpdateEpisodeRequest {
    pub fn into_domain(self, tz: Tz, now: DateTime<Utc>) -> Result<EpisodeUpdate, ApiError> {
        let publication = if self.publish_at.is_some() || self.status.is_some() {
            Some(resolve_publication(
                self.publish_at.as_deref(),
                self.status.as_deref(),
                tz,
                now,
            )?)
        } else {
            None
        };
        Ok(EpisodeUpdate {
            title: self.title.map(parse_title).transpose()?,
            description: self.description,
            audio_url: self.audio_url,
            duration_seconds: self.duration_seconds,
            publication,
        })
    }
}

/// Shared write-path resolution: parse the civil instant and the optional
/// override, then let the domain decide the status.
fn resolve_publication(
    publish_at: Option<&str>,
    status: Option<&str>,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<Resolution, ApiError> {
    let civil = publish_at.map(parse_civil).transpose()?;
    let explicit = status
        .map(|s| s.parse::<PublicationStatus>())
        .transpose()
        .map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;

    if explicit == Some(PublicationStatus::Scheduled) && civil.is_none() {
        return Err(ApiError::UnprocessableEntity(
            "scheduling requires a publish_at instant".to_string(),
        ));
    }

    resolve_initial_status(civil, explicit, tz, now).map_err(ApiError::from)
}

fn parse_title(title: String) -> Result<Title, ApiError> {
    Title::try_new(title).map_err(|e| ApiError::UnprocessableEntity(e.to_string()))
}

fn parse_slug(slug: String) -> Result<Slug, ApiError> {
    Slug::try_new(slug).map_err(|e| ApiError::UnprocessableEntity(e.to_string()))
}

// Responses.

#[derive(Debug, Clone, Serialize)]
pub struct ArticleResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub body: String,
    pub image_url: Option<String>,
    pub featured: bool,
    pub status: PublicationStatus,
    pub publish_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Article> for ArticleResponse {
    fn from(article: Article) -> Self {
        Self {
            id: article.id.0,
            title: article.title.into_inner(),
            slug: article.slug.into_inner(),
            summary: article.summary,
            body: article.body,
            image_url: article.image_url,
            featured: article.featured,
            status: article.status,
            publish_at: article.publish_at,
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgramResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Program> for ProgramResponse {
    fn from(program: Program) -> Self {
        Self {
            id: program.id.0,
            title: program.title.into_inner(),
            slug: program.slug.into_inner(),
            description: program.description,
            created_at: program.created_at,
            updated_at: program.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EpisodeResponse {
    pub id: i64,
    pub program_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub audio_url: String,
    pub duration_seconds: Option<i32>,
    pub status: PublicationStatus,
    pub publish_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Episode> for EpisodeResponse {
    fn from(episode: Episode) -> Self {
        Self {
            id: episode.id.0,
            program_id: episode.program_id.0,
            title: episode.title.into_inner(),
            description: episode.description,
            audio_url: episode.audio_url,
            duration_seconds: episode.duration_seconds,
            status: episode.status,
            publish_at: episode.publish_at,
            created_at: episode.created_at,
            updated_at: episode.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletedResponse {
    pub id: i64,
}
