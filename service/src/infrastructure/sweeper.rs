use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::domain::repository::ContentRepository;
use crate::domain::sweep::run_sweep;

/// Spawn the recurring publication sweep.
///
/// Each tick is an independent invocation against the store; a failed tick
/// leaves every row as it was and the next tick retries. The page-load
/// trigger runs the same sweep, so the two interleave safely.
pub fn spawn<R: ContentRepository>(repository: R, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match run_sweep(&repository, Utc::now()).await {
                Ok(report) if report.total() > 0 => {
                    tracing::info!(
                        articles = report.articles.len(),
                        episodes = report.episodes.len(),
                        "sweep published due records"
                    );
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::error!(?err, "publication sweep failed, retrying on next tick");
                }
            }
        }
    })
}
