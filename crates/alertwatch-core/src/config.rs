use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::composite::CompositeRule;
use crate::error::{Result, WatchError};
use crate::region::{RegionSeed, RegionTable};

// ---------------------------------------------------------------------------
// WatchConfig
// ---------------------------------------------------------------------------

/// Construction-time options of an [`AlertWatcher`](crate::AlertWatcher).
///
/// Loaded from YAML; handlers, the global filter and the test fixture are
/// code-only and live on the builder instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_interval")]
    pub scheduler_interval_seconds: u64,
    #[serde(default = "default_max_instances")]
    pub scheduler_max_instances: usize,
    #[serde(default = "default_drop_padding")]
    pub drop_padding_update: bool,
    pub regions: Vec<RegionSeed>,
    pub composite: CompositeRule,
}

fn default_interval() -> u64 {
    10
}

fn default_max_instances() -> usize {
    1000
}

fn default_drop_padding() -> bool {
    true
}

impl WatchConfig {
    pub fn new(regions: Vec<RegionSeed>, composite: CompositeRule) -> Self {
        Self {
            scheduler_interval_seconds: default_interval(),
            scheduler_max_instances: default_max_instances(),
            drop_padding_update: default_drop_padding(),
            regions,
            composite,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: WatchConfig = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.scheduler_interval_seconds.max(1))
    }

    /// Startup validation: build the region table and check that every id
    /// the composite rule references exists in it.
    pub fn region_table(&self) -> Result<RegionTable> {
        if self.regions.is_empty() {
            return Err(WatchError::EmptyRegionTable);
        }
        let table = RegionTable::from_seeds(self.regions.iter().cloned())?;
        self.composite.validate(&table)?;
        Ok(table)
    }
}
