use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::repository::{ContentRepository, RepositoryError};

/// A record the sweep just moved from `scheduled` to `published`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transitioned {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    pub articles: Vec<Transitioned>,
    pub episodes: Vec<Transitioned>,
}

impl SweepReport {
    pub fn total(&self) -> usize {
        self.articles.len() + self.episodes.len()
    }
}

/// Publish every scheduled record whose instant has been reached.
///
/// Each store call is a single conditional update, so re-running with no
/// newly due records returns an empty report, and concurrent invocations
/// never flip the same row twice. A store failure aborts the whole
/// invocation; nothing is rolled forward and the next trigger retries.
pub async fn run_sweep<R: ContentRepository>(
    repository: &R,
    now: DateTime<Utc>,
) -> Result<SweepReport, RepositoryError> {
    let articles = repository.publish_due_articles(now).await?;
    let episodes = repository.publish_due_episodes(now).await?;
    Ok(SweepReport { articles, episodes })
}
