//! Warm-up gate.
//!
//! The first poll reflects whatever was already active before the watcher
//! started, not a transition. With dropping enabled that first delta is
//! discarded.
//!
//! States: `Cold → Warm` (terminal), taken once on the first completed diff
//! regardless of whether it produced anything.

use crate::diff::UpdateSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Cold,
    Warm,
}

/// What the gate decided for one cycle's delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Nothing changed; nothing to dispatch.
    Empty,
    /// First-cycle delta discarded.
    Dropped { dropped: usize },
    Pass(UpdateSet),
}

#[derive(Debug, Clone)]
pub struct WarmUpGate {
    state: GateState,
    drop_padding_update: bool,
}

impl WarmUpGate {
    pub fn new(drop_padding_update: bool) -> Self {
        Self {
            state: GateState::Cold,
            drop_padding_update,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn admit(&mut self, updates: UpdateSet) -> GateDecision {
        let was_cold = self.state == GateState::Cold;
        self.state = GateState::Warm;

        if updates.is_empty() {
            GateDecision::Empty
        } else if was_cold && self.drop_padding_update {
            GateDecision::Dropped {
                dropped: updates.len(),
            }
        } else {
            GateDecision::Pass(updates)
        }
    }
}
