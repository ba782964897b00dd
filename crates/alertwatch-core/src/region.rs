//! Region table: the ordered, fixed-key map of tracked regions and their
//! current alert flag.
//!
//! Keys are set once from a seed and never added or removed afterwards;
//! only `alert_active` flips. Iteration order is seed order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WatchError};

/// Externally assigned location identifier.
pub type RegionId = u32;

// ---------------------------------------------------------------------------
// RegionEntry / RegionSeed
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionEntry {
    pub id: RegionId,
    pub name: String,
    pub alert_active: bool,
}

/// One row of the static table supplied at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSeed {
    pub id: RegionId,
    pub name: String,
    #[serde(default)]
    pub alert_active: bool,
}

impl RegionSeed {
    pub fn new(id: RegionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            alert_active: false,
        }
    }
}

impl From<RegionSeed> for RegionEntry {
    fn from(seed: RegionSeed) -> Self {
        Self {
            id: seed.id,
            name: seed.name,
            alert_active: seed.alert_active,
        }
    }
}

// ---------------------------------------------------------------------------
// Transition
// ---------------------------------------------------------------------------

/// Outcome of writing a desired state into one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Activated,
    Cleared,
}

impl Transition {
    fn between(current: bool, desired: bool) -> Self {
        match (current, desired) {
            (false, true) => Self::Activated,
            (true, false) => Self::Cleared,
            _ => Self::Unchanged,
        }
    }

    pub fn is_change(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

// ---------------------------------------------------------------------------
// RegionTable
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct RegionTable {
    entries: IndexMap<RegionId, RegionEntry>,
}

impl RegionTable {
    /// Build a table from seed rows, rejecting duplicate ids.
    pub fn from_seeds(seeds: impl IntoIterator<Item = RegionSeed>) -> Result<Self> {
        let mut entries = IndexMap::new();
        for seed in seeds {
            let id = seed.id;
            if entries.insert(id, RegionEntry::from(seed)).is_some() {
                return Err(WatchError::DuplicateRegion(id));
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, id: RegionId) -> Result<&RegionEntry> {
        self.entries.get(&id).ok_or(WatchError::UnknownRegion(id))
    }

    pub fn contains(&self, id: RegionId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Write `active` into region `id`. Writing the current value is a no-op
    /// and reports [`Transition::Unchanged`].
    pub fn set_alert(&mut self, id: RegionId, active: bool) -> Result<Transition> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(WatchError::UnknownRegion(id))?;
        let transition = Transition::between(entry.alert_active, active);
        entry.alert_active = active;
        Ok(transition)
    }

    pub fn ids(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.entries.keys().copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = &RegionEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RegionTable {
        RegionTable::from_seeds([
            RegionSeed::new(14, "Kyiv oblast"),
            RegionSeed::new(34, "Kyiv"),
            RegionSeed::new(32, "Kyiv or oblast"),
        ])
        .unwrap()
    }

    #[test]
    fn preserves_seed_order() {
        let ids: Vec<_> = table().ids().collect();
        assert_eq!(ids, vec![14, 34, 32]);
    }

    #[test]
    fn duplicate_seed_is_rejected() {
        let err = RegionTable::from_seeds([RegionSeed::new(1, "a"), RegionSeed::new(1, "b")])
            .unwrap_err();
        assert!(matches!(err, WatchError::DuplicateRegion(1)));
    }

    #[test]
    fn set_alert_reports_transitions() {
        let mut t = table();
        assert_eq!(t.set_alert(34, true).unwrap(), Transition::Activated);
        assert_eq!(t.set_alert(34, true).unwrap(), Transition::Unchanged);
        assert!(t.get(34).unwrap().alert_active);
        assert_eq!(t.set_alert(34, false).unwrap(), Transition::Cleared);
        assert!(!t.get(34).unwrap().alert_active);
    }

    #[test]
    fn unknown_region_is_an_error() {
        let mut t = table();
        assert!(matches!(t.get(99), Err(WatchError::UnknownRegion(99))));
        assert!(matches!(
            t.set_alert(99, true),
            Err(WatchError::UnknownRegion(99))
        ));
    }

    #[test]
    fn seed_initial_state_is_respected() {
        let mut seed = RegionSeed::new(5, "x");
        seed.alert_active = true;
        let t = RegionTable::from_seeds([seed]).unwrap();
        assert!(t.get(5).unwrap().alert_active);
    }
}
