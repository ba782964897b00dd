use async_trait::async_trait;

use crate::alert::ActiveAlert;
use crate::error::FetchError;

/// Upstream feed of currently active alerts.
#[async_trait]
pub trait AlertSource: Send + Sync {
    /// Fetch every record the upstream currently reports as active.
    async fn fetch_active_alerts(&self) -> Result<Vec<ActiveAlert>, FetchError>;
}

/// A source that always returns the same records. Used as the test fixture
/// path of the watcher.
#[derive(Debug, Clone, Default)]
pub struct FixedSource {
    alerts: Vec<ActiveAlert>,
}

impl FixedSource {
    pub fn new(alerts: Vec<ActiveAlert>) -> Self {
        Self { alerts }
    }
}

#[async_trait]
impl AlertSource for FixedSource {
    async fn fetch_active_alerts(&self) -> Result<Vec<ActiveAlert>, FetchError> {
        Ok(self.alerts.clone())
    }
}
