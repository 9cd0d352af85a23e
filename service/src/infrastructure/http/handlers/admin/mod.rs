use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use canal_common::PublicationStatus;
use chrono::Utc;

use crate::domain::AppState;
use crate::domain::content::{ArticleId, EpisodeId};
use crate::domain::repository::ContentRepository;
use crate::domain::sweep::{SweepReport, run_sweep};
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::handlers::admin::dto::{
    ArticleResponse, CreateArticleRequest, CreateEpisodeRequest, CreateProgramRequest,
    DeletedResponse, EpisodeResponse, ProgramResponse, UpdateArticleRequest,
    UpdateEpisodeRequest,
};

pub mod dto;

pub async fn create_article<S: AppState>(
    State(state): State<S>,
    Json(request): Json<CreateArticleRequest>,
) -> Result<ApiSuccess<ArticleResponse>, ApiError> {
    let new = request.into_domain(state.content_timezone(), Utc::now())?;
    let article = state.repository().create_article(new).await?;
    Ok(ApiSuccess::new(StatusCode::CREATED, article.into()))
}

pub async fn update_article<S: AppState>(
    Path(id): Path<i64>,
    State(state): State<S>,
    Json(request): Json<UpdateArticleRequest>,
) -> Result<ApiSuccess<ArticleResponse>, ApiError> {
    let update = request.into_domain(state.content_timezone(), Utc::now())?;
    let article = state.repository().update_article(ArticleId(id), update).await?;
    Ok(ApiSuccess::new(StatusCode::OK, article.into()))
}

pub async fn delete_article<S: AppState>(
    Path(id): Path<i64>,
    State(state): State<S>,
) -> Result<ApiSuccess<DeletedResponse>, ApiError> {
    state.repository().delete_article(ArticleId(id)).await?;
    Ok(ApiSuccess::new(StatusCode::OK, DeletedResponse { id }))
}

pub async fn unpublish_article<S: AppState>(
    Path(id): Path<i64>,
    State(state): State<S>,
) -> Result<ApiSuccess<ArticleResponse>, ApiError> {
    let article = state
        .repository()
        .set_article_status(ArticleId(id), PublicationStatus::Draft)
        .await?;
    Ok(ApiSuccess::new(StatusCode::OK, article.into()))
}

pub async fn archive_article<S: AppState>(
    Path(id): Path<i64>,
    State(state): State<S>,
) -> Result<ApiSuccess<ArticleResponse>, ApiError> {
    let article = state
        .repository()
        .set_article_status(ArticleId(id), PublicationStatus::Archived)
        .await?;
    Ok(ApiSuccess::new(StatusCode::OK, article.into()))
}

pub async fn create_program<S: AppState>(
    State(state): State<S>,
    Json(request): Json<CreateProgramRequest>,
) -> Result<ApiSuccess<ProgramResponse>, ApiError> {
    let program = state.repository().create_program(request.into_domain()?).await?;
    Ok(ApiSuccess::new(StatusCode::CREATED, program.into()))
}

pub async fn list_programs<S: AppState>(
    State(state): State<S>,
) -> Result<ApiSuccess<Vec<ProgramResponse>>, ApiError> {
    let programs = state.repository().list_programs().await?;
    Ok(ApiSuccess::new(
        StatusCode::OK,
        programs.into_iter().map(ProgramResponse::from).collect(),
    ))
}

pub async fn create_episode<S: AppState>(
    State(state): State<S>,
    Json(request): Json<CreateEpisodeRequest>,
) -> Result<ApiSuccess<EpisodeResponse>, ApiError> {
    let new = request.into_domain(state.content_timezone(), Utc::now())?;
    let episode = state.repository().create_episode(new).await?;
    Ok(ApiSuccess::new(StatusCode::CREATED, episode.into()))
}

pub async fn update_episode<S: AppState>(
    Path(id): Path<i64>,
    State(state): State<S>,
    Json(request): Json<UpdateEpisodeRequest>,
) -> Result<ApiSuccess<EpisodeResponse>, ApiError> {
    let update = request.into_domain(state.content_timezone(), Utc::now())?;
    let episode = state.repository().update_episode(EpisodeId(id), update).await?;
    Ok(ApiSuccess::new(StatusCode::OK, episode.into()))
}

pub async fn delete_episode<S: AppState>(
    Path(id): Path<i64>,
    State(state): State<S>,
) -> Result<ApiSuccess<DeletedResponse>, ApiError> {
    state.repository().delete_episode(EpisodeId(id)).await?;
    Ok(ApiSuccess::new(StatusCode::OK, DeletedResponse { id }))
}

pub async fn unpublish_episode<S: AppState>(
    Path(id): Path<i64>,
    State(state): State<S>,
) -> Result<ApiSuccess<EpisodeResponse>, ApiError> {
    let episode = state
        .repository()
        .set_episode_status(EpisodeId(id), PublicationStatus::Draft)
        .await?;
    Ok(ApiSuccess::new(StatusCode::OK, episode.into()))
}

pub async fn archive_episode<S: AppState>(
    Path(id): Path<i64>,
    State(state): State<S>,
) -> Result<ApiSuccess<EpisodeResponse>, ApiError> {
    let episode = state
        .repository()
        .set_episode_status(EpisodeId(id), PublicationStatus::Archived)
        .await?;
    Ok(ApiSuccess::new(StatusCode::OK, episode.into()))
}

/// Manual trigger for the publication sweep, on top of the timer and the
/// page-load invocations.
pub async fn trigger_sweep<S: AppState>(
    State(state): State<S>,
) -> Result<ApiSuccess<SweepReport>, ApiError> {
    let report = run_sweep(state.repository(), Utc::now()).await?;
    if report.total() > 0 {
        tracing::info!(
            articles = report.articles.len(),
            episodes = report.episodes.len(),
            "manual sweep published due records"
        );
    }
    Ok(ApiSuccess::new(StatusCode::OK, report))
}
