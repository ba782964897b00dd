use thiserror::Error;

use crate::region::RegionId;

/// Failure reported by an [`AlertSource`](crate::source::AlertSource).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The credential was rejected. Polling cannot recover from this.
    #[error("authorization failed: {0}")]
    Authorization(String),

    /// Anything else; the next tick retries independently.
    #[error("fetch failed: {0}")]
    Transient(String),
}

impl FetchError {
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Authorization(_))
    }
}

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("unknown region: {0}")]
    UnknownRegion(RegionId),

    #[error("duplicate region id in seed: {0}")]
    DuplicateRegion(RegionId),

    #[error("invalid composite rule: {0}")]
    InvalidComposite(String),

    #[error("region table is empty")]
    EmptyRegionTable,

    #[error("no alert source configured")]
    MissingSource,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("global filter failed: {0}")]
    GlobalFilter(String),

    #[error("scheduler task failed: {0}")]
    Scheduler(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl WatchError {
    /// True when the error should halt all future scheduling.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fetch(e) if e.is_authorization())
    }
}

pub type Result<T> = std::result::Result<T, WatchError>;
