use std::time::Duration;

use anyhow::anyhow;
use canal_common::database;
use chrono_tz::Tz;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::infrastructure::AppStateImpl;
use crate::infrastructure::http::{HttpServer, HttpServerConfig};
use crate::infrastructure::persistence::PostgresContentRepository;
use crate::infrastructure::settings::Settings;
use crate::infrastructure::sweeper;

mod domain;
mod infrastructure;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // A bad zone identifier must never surface as a per-record failure.
    let content_timezone: Tz = settings
        .content_timezone
        .parse()
        .map_err(|e| anyhow!("unknown timezone identifier {:?}: {}", settings.content_timezone, e))?;

    let database = database::connect(&settings.database).await?;
    println!("Connected to DB");

    let repository = PostgresContentRepository::new(database);
    let state = AppStateImpl::new(repository.clone(), content_timezone);

    let _sweeper = sweeper::spawn(
        repository,
        Duration::from_secs(settings.sweep_interval_seconds),
    );

    let server_config = HttpServerConfig {
        port: &settings.server_port,
    };
    let http_server = HttpServer::new(state, server_config).await?;
    http_server.run().await
}
