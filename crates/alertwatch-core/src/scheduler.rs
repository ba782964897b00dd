//! Interval scheduler driving [`AlertWatcher::run_cycle`].
//!
//! Every tick spawns one cycle unless `max_instances` cycles are already in
//! flight, in which case the tick is skipped. An authorization failure from
//! any cycle halts the schedule for good; other failures only cost that tick.

use std::sync::Arc;

use tokio::sync::{mpsc, watch, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::error::{Result, WatchError};
use crate::watcher::AlertWatcher;

pub struct Scheduler;

impl Scheduler {
    /// Start ticking. The first cycle runs one interval from now.
    ///
    /// Dropping the returned handle without calling [`SchedulerHandle::join`]
    /// stops the schedule.
    pub fn start(watcher: Arc<AlertWatcher>) -> SchedulerHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(run(watcher, stop_rx));
        SchedulerHandle { stop_tx, task }
    }
}

pub struct SchedulerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<Result<()>>,
}

impl SchedulerHandle {
    /// Ask the scheduler to stop. In-flight cycles still run to completion.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Wait for the scheduler to finish. Resolves to the fatal error if an
    /// authorization failure halted it.
    ///
    /// Must not be awaited again once it has resolved.
    pub async fn join(&mut self) -> Result<()> {
        (&mut self.task)
            .await
            .map_err(|e| WatchError::Scheduler(e.to_string()))?
    }
}

async fn run(watcher: Arc<AlertWatcher>, mut stop_rx: watch::Receiver<bool>) -> Result<()> {
    let period = watcher.interval();
    let max_instances = watcher.max_instances();
    let permits = Arc::new(Semaphore::new(max_instances));
    let (fatal_tx, mut fatal_rx) = mpsc::channel::<WatchError>(1);
    let mut cycles = JoinSet::new();

    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        interval_secs = period.as_secs(),
        max_instances, "alert scheduler started"
    );

    let result = loop {
        // A rejected credential wins over a tick that is ready at the same time.
        tokio::select! {
            biased;
            Some(err) = fatal_rx.recv() => {
                error!(error = %err, "upstream rejected credentials, halting scheduler");
                break Err(err);
            }
            _ = ticker.tick() => {
                let Ok(permit) = Arc::clone(&permits).try_acquire_owned() else {
                    warn!(max_instances, "maximum running instances reached, skipping tick");
                    continue;
                };
                let watcher = Arc::clone(&watcher);
                let fatal_tx = fatal_tx.clone();
                cycles.spawn(async move {
                    let _permit = permit;
                    match watcher.run_cycle().await {
                        Ok(_) => {}
                        Err(e) if e.is_fatal() => {
                            let _ = fatal_tx.try_send(e);
                        }
                        Err(e) => warn!(error = %e, "poll cycle failed"),
                    }
                });
            }
            _ = stop_rx.changed() => {
                info!("alert scheduler stopping");
                break Ok(());
            }
            Some(joined) = cycles.join_next(), if !cycles.is_empty() => {
                if let Err(e) = joined {
                    error!(error = %e, "poll cycle task aborted");
                }
            }
        }
    };

    while cycles.join_next().await.is_some() {}
    debug!("alert scheduler drained");
    result
}
