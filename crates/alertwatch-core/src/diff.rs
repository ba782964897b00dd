//! Minimal-diff computation between the region table and the set of
//! regions upstream currently reports as alerting.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::alert::NotificationAlert;
use crate::error::Result;
use crate::region::{RegionEntry, RegionId, RegionTable};

// ---------------------------------------------------------------------------
// UpdateSet
// ---------------------------------------------------------------------------

/// Regions whose alert state changed during one cycle, keyed by id in the
/// order they were found changed. Each id appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSet {
    entries: IndexMap<RegionId, RegionEntry>,
}

impl UpdateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `entry`. A second record for the same id replaces the first
    /// in place, keeping its original position.
    pub fn record(&mut self, entry: RegionEntry) {
        self.entries.insert(entry.id, entry);
    }

    pub fn get(&self, id: RegionId) -> Option<&RegionEntry> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: RegionId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert to the dispatch shape, preserving order.
    pub fn into_alerts(self) -> Vec<NotificationAlert> {
        self.entries
            .into_values()
            .map(NotificationAlert::from)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

/// Bring every region except `skip` in line with `active`, returning the
/// regions that flipped.
///
/// Ids in `active` that the table does not know are ignored.
pub fn apply_active(
    table: &mut RegionTable,
    active: &HashSet<RegionId>,
    skip: RegionId,
) -> Result<UpdateSet> {
    let mut updates = UpdateSet::new();
    let ids: Vec<RegionId> = table.ids().filter(|id| *id != skip).collect();

    for id in ids {
        let transition = table.set_alert(id, active.contains(&id))?;
        if transition.is_change() {
            updates.record(table.get(id)?.clone());
        }
    }

    Ok(updates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::RegionSeed;

    const COMPOSITE: RegionId = 32;

    fn table() -> RegionTable {
        RegionTable::from_seeds([
            RegionSeed::new(3, "Khmelnytskyi oblast"),
            RegionSeed::new(14, "Kyiv oblast"),
            RegionSeed::new(34, "Kyiv"),
            RegionSeed::new(COMPOSITE, "Kyiv or oblast"),
        ])
        .unwrap()
    }

    fn set(ids: &[RegionId]) -> HashSet<RegionId> {
        ids.iter().copied().collect()
    }

    #[test]
    fn reports_only_flipped_regions() {
        let mut t = table();
        let updates = apply_active(&mut t, &set(&[34, 3]), COMPOSITE).unwrap();
        assert_eq!(updates.ids().collect::<Vec<_>>(), vec![3, 34]);
        assert!(updates.get(34).unwrap().alert_active);

        let updates = apply_active(&mut t, &set(&[34, 14]), COMPOSITE).unwrap();
        assert_eq!(updates.ids().collect::<Vec<_>>(), vec![3, 14]);
        assert!(!updates.get(3).unwrap().alert_active);
        assert!(updates.get(14).unwrap().alert_active);
    }

    #[test]
    fn same_input_twice_is_empty() {
        let mut t = table();
        apply_active(&mut t, &set(&[14]), COMPOSITE).unwrap();
        let updates = apply_active(&mut t, &set(&[14]), COMPOSITE).unwrap();
        assert!(updates.is_empty());
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut t = table();
        let updates = apply_active(&mut t, &set(&[999, 1000]), COMPOSITE).unwrap();
        assert!(updates.is_empty());
    }

    #[test]
    fn composite_id_is_never_written_by_diff() {
        let mut t = table();
        let updates = apply_active(&mut t, &set(&[COMPOSITE]), COMPOSITE).unwrap();
        assert!(updates.is_empty());
        assert!(!t.get(COMPOSITE).unwrap().alert_active);
    }

    #[test]
    fn minimal_diff_holds_across_consecutive_sets() {
        let sets: [&[RegionId]; 5] = [&[], &[3, 14], &[14, 34], &[3, 14, 34], &[]];
        let mut t = table();
        let mut previous = set(&[]);
        for ids in sets {
            let current = set(ids);
            let updates = apply_active(&mut t, &current, COMPOSITE).unwrap();
            let expected: HashSet<RegionId> =
                previous.symmetric_difference(&current).copied().collect();
            let got: HashSet<RegionId> = updates.ids().collect();
            assert_eq!(got, expected, "transition {previous:?} -> {current:?}");
            previous = current;
        }
    }

    #[test]
    fn into_alerts_keeps_order() {
        let mut t = table();
        let alerts = apply_active(&mut t, &set(&[34, 3]), COMPOSITE)
            .unwrap()
            .into_alerts();
        let ids: Vec<_> = alerts.iter().map(|a| a.location_id).collect();
        assert_eq!(ids, vec![3, 34]);
        assert_eq!(alerts[1].title, "Kyiv");
    }
}
