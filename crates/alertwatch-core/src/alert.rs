use serde::{Deserialize, Serialize};

use crate::region::{RegionEntry, RegionId};

/// One region state change, in the shape handed to notification handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAlert {
    pub location_id: RegionId,
    pub title: String,
    pub alert_active: bool,
}

impl From<RegionEntry> for NotificationAlert {
    fn from(entry: RegionEntry) -> Self {
        Self {
            location_id: entry.id,
            title: entry.name,
            alert_active: entry.alert_active,
        }
    }
}

/// A record returned by the upstream active-alerts feed. Only the location
/// id matters to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveAlert {
    pub location_uid: RegionId,
}

impl ActiveAlert {
    pub fn new(location_uid: RegionId) -> Self {
        Self { location_uid }
    }
}
