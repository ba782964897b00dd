//! `alertwatch-core` — region alert-state diffing and notification dispatch.
//!
//! Each poll cycle fetches the regions upstream currently reports as
//! alerting, folds them into a fixed region table, derives the composite
//! region, and fans the resulting delta out to registered handlers.
//!
//! # Architecture
//!
//! ```text
//! Scheduler tick
//!     │
//!     ▼
//! AlertWatcher::run_cycle
//!     │  FETCH      AlertSource (HTTP client, or a fixed test fixture)
//!     │  DIFF       diff::apply_active   → UpdateSet (minimal delta)
//!     │  COMPOSITE  CompositeRule::apply → target = source_a OR source_b
//!     │  GATE       WarmUpGate           → first delta dropped
//!     ▼
//! Dispatcher      global filter → per-handler filters → concurrent actions
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use alertwatch_core::{AlertWatcher, Handler, Scheduler, WatchConfig};
//! use std::sync::Arc;
//!
//! let config = WatchConfig::load("alertwatch.yaml".as_ref())?;
//! let watcher = AlertWatcher::builder(config)
//!     .source(client)
//!     .handler(Handler::new("log", |alerts, _args| async move {
//!         println!("{alerts:?}");
//!         anyhow::Ok(())
//!     }))
//!     .build()?;
//!
//! let handle = Scheduler::start(Arc::new(watcher));
//! handle.join().await?;
//! ```

pub mod alert;
pub mod composite;
pub mod config;
pub mod diff;
pub mod dispatch;
pub mod error;
pub mod gate;
pub mod region;
pub mod scheduler;
pub mod source;
pub mod watcher;

pub use alert::{ActiveAlert, NotificationAlert};
pub use composite::CompositeRule;
pub use config::WatchConfig;
pub use diff::UpdateSet;
pub use dispatch::{
    DispatchReport, Dispatcher, Handler, HandlerArgs, HandlerFailure, HandlerStage,
};
pub use error::{FetchError, Result, WatchError};
pub use gate::{GateDecision, GateState, WarmUpGate};
pub use region::{RegionEntry, RegionId, RegionSeed, RegionTable, Transition};
pub use scheduler::{Scheduler, SchedulerHandle};
pub use source::{AlertSource, FixedSource};
pub use watcher::{AlertWatcher, CycleOutcome, WatcherBuilder};
