use axum::http::StatusCode;

pub mod admin;
pub mod public;

// health check handler
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}
