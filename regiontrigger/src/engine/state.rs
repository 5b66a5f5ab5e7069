//! Per-participant region state.

use std::sync::Arc;

use regiontrigger_core::RegionPolicy;
use serde::{Deserialize, Serialize};

use crate::store::PolicyTable;

/// Region-imposed constraint on a participant's PvP flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForcedPvp {
    /// PvP must stay on
    ForcedOn,
    /// PvP must stay off
    ForcedOff,
    /// The participant chooses
    #[default]
    Unconstrained,
}

impl ForcedPvp {
    /// Whether a request to set PvP to `requested` violates the constraint.
    #[must_use]
    pub const fn contradicts(self, requested: bool) -> bool {
        matches!(
            (self, requested),
            (Self::ForcedOn, false) | (Self::ForcedOff, true)
        )
    }
}

/// What the engine tracks for one connected participant.
///
/// `current_region` holds the region name only. Readers resolve it against
/// the store's current table, so a policy deleted since the last tick
/// reads as "no region" until the next tick runs the leave effects from
/// `entered_policy`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantRegionState {
    /// Region the engine last placed the participant in
    pub current_region: Option<String>,
    /// Policy the enter effects were applied from
    pub entered_policy: Option<Arc<RegionPolicy>>,
    /// PvP constraint
    pub forced_pvp: ForcedPvp,
    /// Whether PvP toggling is locked
    pub pvp_toggle_locked: bool,
    /// Whether the enter effects enabled god mode
    pub god_mode_applied: bool,
    /// Temp group the enter effects applied
    pub temp_group_applied: Option<String>,
    /// Ticks since the ambient message was last sent
    pub message_cooldown: u32,
}

impl ParticipantRegionState {
    /// The live policy of the current region, if it still exists.
    #[must_use]
    pub fn current_policy(&self, table: &PolicyTable) -> Option<Arc<RegionPolicy>> {
        self.current_region
            .as_deref()
            .and_then(|name| table.get(name))
            .cloned()
    }

    /// Whether any PvP constraint is active.
    #[must_use]
    pub fn pvp_constrained(&self) -> bool {
        self.forced_pvp != ForcedPvp::Unconstrained || self.pvp_toggle_locked
    }
}
