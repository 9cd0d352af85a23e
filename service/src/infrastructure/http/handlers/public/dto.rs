use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::content::{Article, Episode, Program};

// Public read-path shapes. No status field: anything returned here is
// already visible by the publication predicate.

#[derive(Debug, Clone, Serialize)]
pub struct PublicArticleResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub body: String,
    pub image_url: Option<String>,
    pub featured: bool,
    pub publish_at: Option<DateTime<Utc>>,
}

impl From<Article> for PublicArticleResponse {
    fn from(article: Article) -> Self {
        Self {
            id: article.id.0,
            title: article.title.into_inner(),
            slug: article.slug.into_inner(),
            summary: article.summary,
            body: article.body,
            image_url: article.image_url,
            featured: article.featured,
            publish_at: article.publish_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicProgramResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
}

impl From<Program> for PublicProgramResponse {
    fn from(program: Program) -> Self {
        Self {
            id: program.id.0,
            title: program.title.into_inner(),
            slug: program.slug.into_inner(),
            description: program.description,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicEpisodeResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub audio_url: String,
    pub duration_seconds: Option<i32>,
    pub publish_at: Option<DateTime<Utc>>,
}

impl From<Episode> for PublicEpisodeResponse {
    fn from(episode: Episode) -> Self {
        Self {
            id: episode.id.0,
            title: episode.title.into_inner(),
            description: episode.description,
            audio_url: episode.audio_url,
            duration_seconds: episode.duration_seconds,
            publish_at: episode.publish_at,
        }
    }
}

/// Episodes grouped per program for the radio landing page.
#[derive(Debug, Clone, Serialize)]
pub struct ProgramEpisodesResponse {
    pub program_id: i64,
    pub episodes: Vec<PublicEpisodeResponse>,
}
