//! Poll cycle controller.
//!
//! One cycle is `FETCH → DIFF → COMPOSITE → GATE → DISPATCH`, strictly in
//! that order. DIFF through GATE run under one lock over the region table
//! and gate, so overlapping cycles never interleave their state writes.
//! FETCH and DISPATCH happen outside the lock.

use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::alert::{ActiveAlert, NotificationAlert};
use crate::composite::CompositeRule;
use crate::config::WatchConfig;
use crate::diff;
use crate::dispatch::{DispatchReport, Dispatcher, Handler};
use crate::error::{Result, WatchError};
use crate::gate::{GateDecision, GateState, WarmUpGate};
use crate::region::{RegionEntry, RegionId, RegionTable};
use crate::source::{AlertSource, FixedSource};

/// What a single cycle ended up doing.
#[derive(Debug)]
pub enum CycleOutcome {
    /// No region changed state.
    Unchanged,
    /// The first cycle's delta was swallowed by the warm-up gate.
    WarmUpDropped { dropped: usize },
    /// The global filter removed every alert.
    FilteredOut,
    Dispatched(DispatchReport),
}

struct WatchState {
    table: RegionTable,
    gate: WarmUpGate,
}

pub struct AlertWatcher {
    source: Arc<dyn AlertSource>,
    composite: CompositeRule,
    dispatcher: Dispatcher,
    state: Mutex<WatchState>,
    cycles: AtomicU64,
    interval: Duration,
    max_instances: usize,
}

impl AlertWatcher {
    pub fn builder(config: WatchConfig) -> WatcherBuilder {
        WatcherBuilder {
            config,
            source: None,
            fixture: None,
            handlers: Vec::new(),
            dispatcher: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_instances(&self) -> usize {
        self.max_instances
    }

    /// Number of cycles started so far.
    pub fn cycles_started(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    /// Current region entries, in table order.
    pub async fn snapshot(&self) -> Vec<RegionEntry> {
        self.state.lock().await.table.entries().cloned().collect()
    }

    pub async fn gate_state(&self) -> GateState {
        self.state.lock().await.gate.state()
    }

    /// Run one full poll cycle.
    ///
    /// A fetch failure aborts before any state is touched. Handler failures
    /// are reported inside [`CycleOutcome::Dispatched`], not as `Err`.
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let cycle = self.cycles.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(cycle, "poll cycle started");

        let active = self.source.fetch_active_alerts().await?;
        let active: HashSet<RegionId> = active.iter().map(|a| a.location_uid).collect();

        let decision = {
            let mut guard = self.state.lock().await;
            let WatchState { table, gate } = &mut *guard;
            let mut updates = diff::apply_active(table, &active, self.composite.target)?;
            self.composite.apply(table, &mut updates)?;
            gate.admit(updates)
        };

        let outcome = match decision {
            GateDecision::Empty => CycleOutcome::Unchanged,
            GateDecision::Dropped { dropped } => {
                info!(cycle, dropped, "dropping warm-up update");
                CycleOutcome::WarmUpDropped { dropped }
            }
            GateDecision::Pass(updates) => {
                let alerts: Vec<NotificationAlert> = updates.into_alerts();
                match self.dispatcher.dispatch(cycle, alerts).await? {
                    Some(report) => CycleOutcome::Dispatched(report),
                    None => CycleOutcome::FilteredOut,
                }
            }
        };

        debug!(cycle, ?outcome, "poll cycle finished");
        Ok(outcome)
    }
}

// ---------------------------------------------------------------------------
// WatcherBuilder
// ---------------------------------------------------------------------------

pub struct WatcherBuilder {
    config: WatchConfig,
    source: Option<Arc<dyn AlertSource>>,
    fixture: Option<Vec<ActiveAlert>>,
    handlers: Vec<Handler>,
    dispatcher: Option<Dispatcher>,
}

impl WatcherBuilder {
    pub fn source(mut self, source: impl AlertSource + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Serve this list on every cycle instead of calling the source.
    pub fn test_fixture(mut self, alerts: Vec<ActiveAlert>) -> Self {
        self.fixture = Some(alerts);
        self
    }

    pub fn handler(mut self, handler: Handler) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn global_filter<F, Fut>(mut self, filter: F) -> Self
    where
        F: Fn(Vec<NotificationAlert>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Vec<NotificationAlert>>> + Send + 'static,
    {
        let dispatcher = self.dispatcher.take().unwrap_or_default();
        self.dispatcher = Some(dispatcher.with_global_filter(filter));
        self
    }

    /// Validate the configuration and assemble the watcher.
    pub fn build(self) -> Result<AlertWatcher> {
        let table = self.config.region_table()?;

        let source: Arc<dyn AlertSource> = match (self.fixture, self.source) {
            (Some(fixture), _) => Arc::new(FixedSource::new(fixture)),
            (None, Some(source)) => source,
            (None, None) => return Err(WatchError::MissingSource),
        };

        let mut dispatcher = self.dispatcher.unwrap_or_default();
        dispatcher.register(self.handlers);

        Ok(AlertWatcher {
            source,
            composite: self.config.composite.clone(),
            dispatcher,
            state: Mutex::new(WatchState {
                table,
                gate: WarmUpGate::new(self.config.drop_padding_update),
            }),
            cycles: AtomicU64::new(0),
            interval: self.config.interval(),
            max_instances: self.config.scheduler_max_instances.max(1),
        })
    }
}
