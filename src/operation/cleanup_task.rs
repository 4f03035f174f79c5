use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, instrument};

use super::runner::OperationRunner;

/// Periodically drops finished operations past their retention window
///
/// Runs until the surrounding task is aborted or the runtime shuts down.
#[instrument(skip(runner))]
pub async fn start_cleanup_task(runner: Arc<OperationRunner>, cleanup_interval: Duration) {
    info!(
        cleanup_interval_secs = cleanup_interval.as_secs(),
        "Starting operation cleanup background task"
    );

    let mut ticker = interval(cleanup_interval);

    loop {
        ticker.tick().await;

        let evicted = runner.evict_finished().await;
        if evicted > 0 {
            info!(evicted = evicted, "Operation cleanup completed");
        } else {
            debug!("Operation cleanup found nothing to evict");
        }
    }
}
