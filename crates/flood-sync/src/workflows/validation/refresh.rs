use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use super::repository::{ReportStore, SensorStore};
use super::service::PeerValidationService;

/// Handle to the background task that keeps the report cache in sync.
pub struct RefreshHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Stop the task and wait for the in-flight refresh, if any, to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(err) = self.task.await {
            warn!(error = %err, "report refresh task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn the periodic refresh. The first refresh runs immediately.
///
/// Failures are logged and left for the next tick to retry.
pub fn spawn_refresh<R, S>(
    service: Arc<PeerValidationService<R, S>>,
    every: Duration,
) -> RefreshHandle
where
    R: ReportStore + 'static,
    S: SensorStore + 'static,
{
    let (shutdown, mut stop) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut ticker = time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if let Err(err) = service.refresh().await {
                        warn!(error = %err, "failed to refresh reports from store");
                    }
                }
            }
        }

        debug!("report refresh task stopped");
    });

    RefreshHandle { shutdown, task }
}
