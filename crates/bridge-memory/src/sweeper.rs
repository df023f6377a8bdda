// Periodic sweep, stopped over a watch channel

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Something the background sweeper can clean up on every tick
pub trait Sweep: Send + Sync + 'static {
    fn sweep_tick(&self);
}

/// Handle to a running sweep loop
pub struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Spawn the sweep loop on the current tokio runtime.
    ///
    /// The loop holds only a `Weak` and exits once the target is gone.
    pub fn spawn<T: Sweep>(target: Weak<T>, interval: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_sweep_loop(target, interval, shutdown_rx));
        debug!(interval_secs = interval.as_secs(), "Sweeper started");
        Self { shutdown_tx, task }
    }

    /// Signal the loop and wait for it to finish
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            if !e.is_cancelled() {
                warn!("Sweeper ended abnormally: {}", e);
            }
        }
        debug!("Sweeper stopped");
    }

    pub fn abort(self) {
        self.task.abort();
    }
}

async fn run_sweep_loop<T: Sweep>(
    target: Weak<T>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    // First tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                let Some(target) = target.upgrade() else {
                    break;
                };
                target.sweep_tick();
            }
        }
    }
}
