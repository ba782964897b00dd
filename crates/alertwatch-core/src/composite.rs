//! Derived region whose state is the OR of two observed regions.
//!
//! Upstream reports the city and the surrounding oblast separately;
//! consumers that want one combined signal subscribe to the target id.

use serde::{Deserialize, Serialize};

use crate::diff::UpdateSet;
use crate::error::{Result, WatchError};
use crate::region::{RegionId, RegionTable};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeRule {
    /// Synthetic region written only by this rule.
    pub target: RegionId,
    pub sources: [RegionId; 2],
    /// Display name used in updates. Falls back to the table's name.
    #[serde(default)]
    pub name: Option<String>,
}

impl CompositeRule {
    pub fn new(target: RegionId, sources: [RegionId; 2]) -> Self {
        Self {
            target,
            sources,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Every id this rule touches must exist before the first cycle. The
    /// sources must be two distinct regions, neither of them the target.
    pub fn validate(&self, table: &RegionTable) -> Result<()> {
        let [a, b] = self.sources;
        if a == b {
            return Err(WatchError::InvalidComposite(format!(
                "sources must differ, got {a} twice"
            )));
        }
        if self.sources.contains(&self.target) {
            return Err(WatchError::InvalidComposite(format!(
                "target {} is also a source",
                self.target
            )));
        }
        table.get(self.target)?;
        for id in self.sources {
            table.get(id)?;
        }
        Ok(())
    }

    /// Recompute the target from the sources' current state. Runs every
    /// cycle whether or not either source moved.
    pub fn apply(&self, table: &mut RegionTable, updates: &mut UpdateSet) -> Result<()> {
        let [a, b] = self.sources;
        let derived = table.get(a)?.alert_active || table.get(b)?.alert_active;

        if table.set_alert(self.target, derived)?.is_change() {
            let mut entry = table.get(self.target)?.clone();
            if let Some(name) = &self.name {
                entry.name = name.clone();
            }
            updates.record(entry);
        }
        Ok(())
    }
}
