use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::service::StockWatcher;

/// Runs a check cycle now and then every `every`, which must be non-zero.
///
/// Cycles run inline in the task, so a slow fetch delays the next tick
/// rather than overlapping with it. Manual triggers are not coordinated
/// with this loop.
pub fn spawn_scheduler(watcher: Arc<StockWatcher>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = interval(every);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tick.tick().await;
            let res = watcher.check_stock_changes().await;
            if res.success {
                info!(
                    changes = res.changes.as_ref().map_or(0, Vec::len),
                    "scheduled check complete"
                );
            } else {
                warn!(error = ?res.error, "scheduled check failed");
            }
        }
    })
}
