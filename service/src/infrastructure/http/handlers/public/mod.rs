use axum::extract::{Path, State};
use axum::http::StatusCode;
use canal_common::Slug;
use chrono::Utc;
use serde::Deserialize;

use crate::domain::AppState;
use crate::domain::content::{ArticleFilter, ProgramId};
use crate::domain::repository::ContentRepository;
use crate::domain::sweep::run_sweep;
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::handlers::public::dto::{
    ProgramEpisodesResponse, PublicArticleResponse, PublicEpisodeResponse, PublicProgramResponse,
};
use crate::infrastructure::http::querystring::QueryString;

pub mod dto;

const MAX_PAGE_SIZE: i64 = 100;

#[derive(Deserialize, Debug)]
pub struct ArticleListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub featured: Option<bool>,
}

pub async fn list_articles<S: AppState>(
    QueryString(params): QueryString<ArticleListParams>,
    State(state): State<S>,
) -> Result<ApiSuccess<Vec<PublicArticleResponse>>, ApiError> {
    opportunistic_sweep(state.repository()).await;

    let filter = ArticleFilter {
        featured: params.featured,
        limit: params.limit.unwrap_or(20).clamp(1, MAX_PAGE_SIZE),
        offset: params.offset.unwrap_or(0).max(0),
    };
    let articles = state.repository().list_published_articles(filter).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        articles.into_iter().map(PublicArticleResponse::from).collect(),
    ))
}

pub async fn article_by_slug<S: AppState>(
    Path(slug): Path<String>,
    State(state): State<S>,
) -> Result<ApiSuccess<PublicArticleResponse>, ApiError> {
    let slug =
        Slug::try_new(slug).map_err(|err| ApiError::UnprocessableEntity(err.to_string()))?;

    opportunistic_sweep(state.repository()).await;

    let article = state
        .repository()
        .find_published_article_by_slug(&slug)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(ApiSuccess::new(StatusCode::OK, article.into()))
}

pub async fn list_programs<S: AppState>(
    State(state): State<S>,
) -> Result<ApiSuccess<Vec<PublicProgramResponse>>, ApiError> {
    let programs = state.repository().list_programs().await?;
    Ok(ApiSuccess::new(
        StatusCode::OK,
        programs.into_iter().map(PublicProgramResponse::from).collect(),
    ))
}

#[derive(Deserialize, Debug)]
pub struct EpisodeListParams {
    pub program: Option<i64>,
}

pub async fn list_episodes<S: AppState>(
    QueryString(params): QueryString<EpisodeListParams>,
    State(state): State<S>,
) -> Result<ApiSuccess<Vec<ProgramEpisodesResponse>>, ApiError> {
    use itertools::Itertools;

    opportunistic_sweep(state.repository()).await;

    let episodes = state
        .repository()
        .list_published_episodes(params.program.map(ProgramId))
        .await?;

    let mut groups: Vec<ProgramEpisodesResponse> = episodes
        .into_iter()
        .into_group_map_by(|episode| episode.program_id)
        .into_iter()
        .map(|(program_id, episodes)| ProgramEpisodesResponse {
            program_id: program_id.0,
            episodes: episodes.into_iter().map(PublicEpisodeResponse::from).collect(),
        })
        .collect();
    groups.sort_by_key(|group| group.program_id);

    Ok(ApiSuccess::new(StatusCode::OK, groups))
}

/// Page-load trigger for the sweep. A failure here must not take the page
/// down; the timer retries on its own cadence.
async fn opportunistic_sweep<R: ContentRepository>(repository: &R) {
    match run_sweep(repository, Utc::now()).await {
        Ok(report) if report.total() > 0 => {
            tracing::debug!(published = report.total(), "page-load sweep published due records");
        }
        Ok(_) => {}
        Err(err) => {
            tracing::warn!(?err, "page-load sweep failed, serving current state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_utils::{InMemoryRepository, article_input};
    use canal_common::{PublicationStatus, Resolution};
    use chrono::Duration;
    use chrono_tz::Tz;

    #[derive(Clone)]
    struct TestState {
        repository: InMemoryRepository,
    }

    impl AppState for TestState {
        type R = InMemoryRepository;

        fn repository(&self) -> &Self::R {
            &self.repository
        }

        fn content_timezone(&self) -> Tz {
            chrono_tz::America::Mexico_City
        }
    }

    #[tokio::test]
    async fn listing_publishes_due_records_before_reading() {
        let repository = InMemoryRepository::default();
        repository
            .create_article(article_input(
                "dictamen-aprobado",
                Resolution {
                    status: PublicationStatus::Scheduled,
                    publish_at: Some(Utc::now() - Duration::minutes(1)),
                },
            ))
            .await
            .unwrap();

        let state = TestState { repository };
        let params = ArticleListParams {
            limit: None,
            offset: None,
            featured: None,
        };
        // The scheduled record became due; a page load must surface it.
        list_articles(QueryString(params), State(state.clone()))
            .await
            .unwrap();

        let stored = state
            .repository
            .list_published_articles(ArticleFilter::default())
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, PublicationStatus::Published);
    }

    #[tokio::test]
    async fn unknown_slug_is_not_found() {
        let state = TestState {
            repository: InMemoryRepository::default(),
        };
        let error = article_by_slug(Path("no-existe".to_owned()), State(state))
            .await
            .unwrap_err();
        assert_eq!(error, ApiError::NotFound);
    }
}
