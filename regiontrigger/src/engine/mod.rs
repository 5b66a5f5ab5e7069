//! Region transition engine and enforcement checks
//!
//! - [`TransitionEngine`]: per-participant region tracking and enter/leave effects
//! - [`EnforcementGate`]: allow/deny checks for in-world actions
//! - [`ParticipantRegionState`]: what the engine knows about one participant

pub mod gate;
pub mod state;
pub mod transition;

pub use gate::{ControlFlags, EnforcementGate, PermissionOverride, Verdict};
pub use state::{ForcedPvp, ParticipantRegionState};
pub use transition::TransitionEngine;

use crate::host::Participant;

/// Permissions that exempt a participant from one region behavior.
pub mod bypass {
    /// Place banned tiles
    pub const TILEBAN: &str = "regiontrigger.bypass.tileban";
    /// Create banned projectiles
    pub const PROJBAN: &str = "regiontrigger.bypass.projban";
    /// Use banned items
    pub const ITEMBAN: &str = "regiontrigger.bypass.itemban";
    /// Opt out of granted temporary permissions
    pub const TEMPPERM: &str = "regiontrigger.bypass.tempperm";
    /// Keep the own group inside temp-group regions
    pub const TEMPGROUP: &str = "regiontrigger.bypass.tempgroup";
    /// Survive kill regions
    pub const KILL: &str = "regiontrigger.bypass.kill";
    /// Ignore forced PvP
    pub const PVP: &str = "regiontrigger.bypass.pvp";
    /// Ignore forced no-PvP
    pub const NOPVP: &str = "regiontrigger.bypass.nopvp";
    /// Toggle PvP in locked regions
    pub const INPVP: &str = "regiontrigger.bypass.inpvp";
    /// Enter private regions
    pub const PRIVATE: &str = "regiontrigger.bypass.private";
}

fn has_bypass(participant: &dyn Participant, permission: &str) -> bool {
    participant.has_permission(permission)
}
