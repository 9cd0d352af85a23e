use canal_common::{PublicationStatus, Resolution, Slug, Title};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgramId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpisodeId(pub i64);

/// A news article on the channel site.
#[derive(Debug, Clone)]
pub struct Article {
    pub id: ArticleId,
    pub title: Title,
    pub slug: Slug,
    pub summary: Option<String>,
    pub body: String,
    pub image_url: Option<String>,
    pub featured: bool,
    pub status: PublicationStatus,
    pub publish_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for a create, with the publication outcome already resolved.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: Title,
    pub slug: Slug,
    pub summary: Option<String>,
    pub body: String,
    pub image_url: Option<String>,
    pub featured: bool,
    pub publication: Resolution,
}

/// Partial update; `None` fields are left untouched. A present
/// `publication` rewrites status and publish instant together.
#[derive(Debug, Clone, Default)]
pub struct ArticleUpdate {
    pub title: Option<Title>,
    pub slug: Option<Slug>,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub image_url: Option<String>,
    pub featured: Option<bool>,
    pub publication: Option<Resolution>,
}

/// A recurring radio program. Programs carry no schedule of their own;
/// their episodes do.
#[derive(Debug, Clone)]
pub struct Program {
    pub id: ProgramId,
    pub title: Title,
    pub slug: Slug,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProgram {
    pub title: Title,
    pub slug: Slug,
    pub description: Option<String>,
}

/// One broadcast of a radio program.
#[derive(Debug, Clone)]
pub struct Episode {
    pub id: EpisodeId,
    pub program_id: ProgramId,
    pub title: Title,
    pub description: Option<String>,
    pub audio_url: String,
    pub duration_seconds: Option<i32>,
    pub status: PublicationStatus,
    pub publish_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEpisode {
    pub program_id: ProgramId,
    pub title: Title,
    pub description: Option<String>,
    pub audio_url: String,
    pub duration_seconds: Option<i32>,
    pub publication: Resolution,
}

#[derive(Debug, Clone, Default)]
pub struct EpisodeUpdate {
    pub title: Option<Title>,
    pub description: Option<String>,
    pub audio_url: Option<String>,
    pub duration_seconds: Option<i32>,
    pub publication: Option<Resolution>,
}

/// Paging and filtering for the public article listing.
#[derive(Debug, Clone, Copy)]
pub struct ArticleFilter {
    pub featured: Option<bool>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for ArticleFilter {
    fn default() -> Self {
        Self {
            featured: None,
            limit: 20,
            offset: 0,
        }
    }
}
