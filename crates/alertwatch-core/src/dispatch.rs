//! Notification fan-out.
//!
//! A delta is narrowed once by the optional global filter, then each
//! registered handler decides through its own filter whether it wants the
//! batch. Filters and then surviving handlers run concurrently, each on its
//! own task; every invocation is awaited and its failure or panic captured
//! individually, so one bad handler never hides another's result.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{debug, error, info};

use crate::alert::NotificationAlert;
use crate::error::{Result, WatchError};

/// Fixed keyword arguments stored with a handler and passed to every call.
pub type HandlerArgs = serde_json::Map<String, serde_json::Value>;

type ActionFn =
    dyn Fn(Vec<NotificationAlert>, HandlerArgs) -> BoxFuture<'static, anyhow::Result<()>>
        + Send
        + Sync;
type FilterFn =
    dyn Fn(Vec<NotificationAlert>) -> BoxFuture<'static, anyhow::Result<bool>> + Send + Sync;
type GlobalFilterFn = dyn Fn(Vec<NotificationAlert>) -> BoxFuture<'static, anyhow::Result<Vec<NotificationAlert>>>
    + Send
    + Sync;

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

/// A registered notification target: an async action, its argument bundle
/// and an optional async predicate deciding whether it wants a batch.
#[derive(Clone)]
pub struct Handler {
    name: String,
    args: HandlerArgs,
    action: Arc<ActionFn>,
    filter: Option<Arc<FilterFn>>,
}

impl Handler {
    pub fn new<F, Fut>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn(Vec<NotificationAlert>, HandlerArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            args: HandlerArgs::new(),
            action: Arc::new(move |alerts, args| action(alerts, args).boxed()),
            filter: None,
        }
    }

    pub fn with_args(mut self, args: HandlerArgs) -> Self {
        self.args = args;
        self
    }

    pub fn with_filter<F, Fut>(mut self, filter: F) -> Self
    where
        F: Fn(Vec<NotificationAlert>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        self.filter = Some(Arc::new(move |alerts| filter(alerts).boxed()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &HandlerArgs {
        &self.args
    }

}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerStage {
    Filter,
    Action,
}

#[derive(Debug)]
pub struct HandlerFailure {
    pub handler: String,
    pub stage: HandlerStage,
    pub error: anyhow::Error,
}

/// Result of one fan-out.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Alerts after the global filter, as handed to every handler.
    pub alerts: Vec<NotificationAlert>,
    /// Handlers whose action ran to completion without error.
    pub delivered: Vec<String>,
    /// Handlers whose filter declined the batch.
    pub skipped: Vec<String>,
    pub failures: Vec<HandlerFailure>,
}

impl DispatchReport {
    /// Names of every handler whose action was invoked, successful or not.
    pub fn invoked(&self) -> Vec<&str> {
        self.delivered
            .iter()
            .map(String::as_str)
            .chain(
                self.failures
                    .iter()
                    .filter(|f| f.stage == HandlerStage::Action)
                    .map(|f| f.handler.as_str()),
            )
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct Dispatcher {
    global_filter: Option<Arc<GlobalFilterFn>>,
    handlers: Vec<Handler>,
}

impl Dispatcher {
    pub fn new(handlers: Vec<Handler>) -> Self {
        Self {
            global_filter: None,
            handlers,
        }
    }

    /// Install a filter that narrows each batch before per-handler
    /// filtering. It may drop alerts but must not add any.
    pub fn with_global_filter<F, Fut>(mut self, filter: F) -> Self
    where
        F: Fn(Vec<NotificationAlert>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Vec<NotificationAlert>>> + Send + 'static,
    {
        self.global_filter = Some(Arc::new(move |alerts| filter(alerts).boxed()));
        self
    }

    pub fn register(&mut self, handlers: impl IntoIterator<Item = Handler>) {
        self.handlers.extend(handlers);
    }

    pub fn handlers(&self) -> &[Handler] {
        &self.handlers
    }

    /// Deliver `alerts` to every interested handler.
    ///
    /// Returns `Ok(None)` when the global filter leaves nothing to send.
    /// Handler and handler-filter failures are collected in the report,
    /// never returned as `Err`.
    pub async fn dispatch(
        &self,
        cycle: u64,
        alerts: Vec<NotificationAlert>,
    ) -> Result<Option<DispatchReport>> {
        let alerts = match &self.global_filter {
            Some(filter) => filter(alerts)
                .await
                .map_err(|e| WatchError::GlobalFilter(format!("{e:#}")))?,
            None => alerts,
        };
        if alerts.is_empty() {
            debug!(cycle, "global filter left nothing to dispatch");
            return Ok(None);
        }

        let mut report = DispatchReport {
            alerts,
            ..Default::default()
        };

        // No filter means the handler wants every batch.
        let checks: Vec<_> = self
            .handlers
            .iter()
            .map(|handler| {
                let check = handler
                    .filter
                    .as_ref()
                    .map(|filter| tokio::spawn(filter(report.alerts.clone())));
                (handler, check)
            })
            .collect();

        let mut selected = Vec::new();
        for (handler, check) in checks {
            let verdict = match check {
                None => Ok(true),
                Some(task) => match task.await {
                    Ok(result) => result,
                    Err(join_err) => Err(anyhow::anyhow!("handler filter aborted: {join_err}")),
                },
            };
            match verdict {
                Ok(true) => selected.push(handler),
                Ok(false) => report.skipped.push(handler.name.clone()),
                Err(e) => {
                    error!(cycle, handler = %handler.name, error = %e, "handler filter failed");
                    report.failures.push(HandlerFailure {
                        handler: handler.name.clone(),
                        stage: HandlerStage::Filter,
                        error: e,
                    });
                }
            }
        }

        if selected.is_empty() {
            debug!(cycle, "no handler accepted the batch");
            return Ok(Some(report));
        }

        let tasks: Vec<_> = selected
            .into_iter()
            .map(|handler| {
                let call = (handler.action)(report.alerts.clone(), handler.args.clone());
                (handler.name.clone(), tokio::spawn(call))
            })
            .collect();

        for (name, task) in tasks {
            let outcome = match task.await {
                Ok(result) => result,
                Err(join_err) => Err(anyhow::anyhow!("handler task aborted: {join_err}")),
            };
            match outcome {
                Ok(()) => report.delivered.push(name),
                Err(e) => {
                    error!(cycle, handler = %name, error = %e, "handler action failed");
                    report.failures.push(HandlerFailure {
                        handler: name,
                        stage: HandlerStage::Action,
                        error: e,
                    });
                }
            }
        }

        info!(
            cycle,
            alerts = report.alerts.len(),
            delivered = report.delivered.len(),
            failed = report.failures.len(),
            "alerts dispatched"
        );
        Ok(Some(report))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
