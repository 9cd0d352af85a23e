use anyhow::Context;
use axum::Router;
use axum::routing::{get, post, put};
use axum_prometheus::PrometheusMetricLayer;
use tokio::net;

use crate::domain::AppState;
use crate::infrastructure::http::handlers::{admin, health_check, public};

mod api;
mod handlers;
mod querystring;

/// Configuration for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpServerConfig<'a> {
    pub port: &'a str,
}

/// The application's HTTP server. The underlying HTTP package is opaque to module consumers.
pub struct HttpServer {
    router: axum::Router,
    listener: net::TcpListener,
}

impl HttpServer {
    /// Returns a new HTTP server bound to the port specified in `config`.
    pub async fn new(state: impl AppState, config: HttpServerConfig<'_>) -> anyhow::Result<Self> {
        let trace_layer = tower_http::trace::TraceLayer::new_for_http().make_span_with(
            |request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                tracing::info_span!("http_request", method = ?request.method(), uri)
            },
        );
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

        let router = Router::new()
            .route("/health", get(health_check))
            .nest("/api", api_routes())
            .route("/metrics", get(|| async move { metric_handle.render() }))
            .layer(trace_layer)
            .layer(prometheus_layer)
            .with_state(state);

        let listener = net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
            .await
            .with_context(|| format!("failed to listen on {}", config.port))?;

        Ok(Self { router, listener })
    }

    /// Runs the HTTP server.
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::debug!("listening on {}", self.listener.local_addr().unwrap());
        axum::serve(self.listener, self.router)
            .await
            .context("received error from running server")?;
        Ok(())
    }
}

fn api_routes<S: AppState>() -> Router<S> {
    Router::new()
        // public site
        .route("/articles", get(public::list_articles::<S>))
        .route("/articles/{slug}", get(public::article_by_slug::<S>))
        .route("/programs", get(public::list_programs::<S>))
        .route("/episodes", get(public::list_episodes::<S>))
        // editor surface
        .route("/admin/articles", post(admin::create_article::<S>))
        .route(
            "/admin/articles/{id}",
            put(admin::update_article::<S>).delete(admin::delete_article::<S>),
        )
        .route("/admin/articles/{id}/unpublish", post(admin::unpublish_article::<S>))
        .route("/admin/articles/{id}/archive", post(admin::archive_article::<S>))
        .route(
            "/admin/programs",
            post(admin::create_program::<S>).get(admin::list_programs::<S>),
        )
        .route("/admin/episodes", post(admin::create_episode::<S>))
        .route(
            "/admin/episodes/{id}",
            put(admin::update_episode::<S>).delete(admin::delete_episode::<S>),
        )
        .route("/admin/episodes/{id}/unpublish", post(admin::unpublish_episode::<S>))
        .route("/admin/episodes/{id}/archive", post(admin::archive_episode::<S>))
        .route("/admin/sweep", post(admin::trigger_sweep::<S>))
}
