//! `alerts-client` — fetches active air-raid alerts from alerts.in.ua.
//!
//! [`AlertsClient`] implements [`alertwatch_core::AlertSource`], so it plugs
//! straight into an `AlertWatcher`. A rejected token surfaces as
//! [`alertwatch_core::FetchError::Authorization`], which stops the scheduler;
//! everything else is transient and retried on the next tick.
//!
//! ```rust,ignore
//! use alerts_client::AlertsClient;
//!
//! let client = AlertsClient::new(std::env::var("ALERTS_IN_UA_TOKEN")?);
//! for record in client.active_alerts().await? {
//!     println!("{:?} {:?}", record.location_uid, record.location_title);
//! }
//! ```

pub mod client;
pub mod error;
pub mod types;

pub use client::{AlertsClient, DEFAULT_BASE_URL};
pub use error::ClientError;
pub use types::{ActiveAlertsResponse, AlertRecord, LocationUid};

pub type Result<T> = std::result::Result<T, ClientError>;
