//! Enforcement checks
//!
//! The host calls these synchronously from its action callbacks, before
//! the action takes effect. Checks read the participant's cached region
//! (or, for tile placement, the region at the edited tile) and never
//! modify a policy. Side effects are limited to messaging and corrective
//! host calls.

use std::sync::Arc;

use chrono::Utc;
use regiontrigger_core::{Event, RegionPolicy, TilePoint};
use tracing::debug;

use super::transition::TransitionEngine;
use super::{bypass, has_bypass};
use crate::host::{MessageKind, Participant};
use crate::observability::{EngineEvent, EventEmitter, metrics};

/// Outcome of an enforcement check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The action may proceed
    Allowed,
    /// The action is vetoed; the reason was sent to the participant
    Denied(String),
}

impl Verdict {
    /// Whether the action may proceed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Whether the action was vetoed.
    #[must_use]
    pub const fn is_denied(&self) -> bool {
        matches!(self, Self::Denied(_))
    }
}

/// Outcome of a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionOverride {
    /// The region grants the permission
    Granted,
    /// Fall through to the host's own permission logic
    Defer,
}

/// Input control bits of a player update packet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlFlags(pub u8);

impl ControlFlags {
    /// The "use item" bit.
    pub const USE_ITEM: u8 = 1 << 5;

    /// Whether the use-item bit is set.
    #[must_use]
    pub const fn uses_item(self) -> bool {
        self.0 & Self::USE_ITEM != 0
    }

    /// Clears the use-item bit.
    pub const fn clear_use_item(&mut self) {
        self.0 &= !Self::USE_ITEM;
    }
}

/// Action labels for metrics and events.
mod action {
    pub const TILE: &str = "tile";
    pub const PROJECTILE: &str = "projectile";
    pub const ITEM: &str = "item";
    pub const PVP_TOGGLE: &str = "pvp_toggle";
}

/// Allow/deny checks over the engine's cached participant regions.
#[derive(Debug)]
pub struct EnforcementGate {
    engine: Arc<TransitionEngine>,
    events: Arc<EventEmitter>,
}

impl EnforcementGate {
    /// Creates a gate reading `engine`'s participant state.
    #[must_use]
    pub const fn new(engine: Arc<TransitionEngine>, events: Arc<EventEmitter>) -> Self {
        Self { engine, events }
    }

    /// Checks placing tile type `tile` at (`x`, `y`).
    ///
    /// Uses the region at the edited tile, not the participant's region.
    /// On denial the tile is restored client-side.
    pub fn check_tile_placement(
        &self,
        participant: &dyn Participant,
        x: i32,
        y: i32,
        tile: u16,
    ) -> Verdict {
        let point = TilePoint::new(x, y);
        let Some(policy) = self.engine.region_at(point) else {
            return Verdict::Allowed;
        };
        if !policy.has_event(Event::Tileban)
            || !policy.tile_is_banned(tile)
            || has_bypass(participant, bypass::TILEBAN)
        {
            return Verdict::Allowed;
        }

        participant.restore_tile(point);
        self.deny(
            participant,
            &policy,
            action::TILE,
            "You do not have permission to place this tile.",
        )
    }

    /// Checks a projectile of type `projectile` spawned by `owner`.
    ///
    /// On denial the owner is disabled and the projectile at `index` removed.
    pub fn check_projectile_create(
        &self,
        owner: &dyn Participant,
        index: i32,
        projectile: u16,
    ) -> Verdict {
        let Some(policy) = self.engine.current_policy(owner.id()) else {
            return Verdict::Allowed;
        };
        if !policy.has_event(Event::Projban)
            || !policy.projectile_is_banned(projectile)
            || has_bypass(owner, bypass::PROJBAN)
        {
            return Verdict::Allowed;
        }

        owner.disable(&format!(
            "Create banned projectile in region {}.",
            policy.region
        ));
        let verdict = self.deny(
            owner,
            &policy,
            action::PROJECTILE,
            "This projectile is banned here.",
        );
        owner.remove_projectile(index);
        verdict
    }

    /// Checks using the item named `item`.
    pub fn check_item_use(&self, participant: &dyn Participant, item: &str) -> Verdict {
        let Some(policy) = self.engine.current_policy(participant.id()) else {
            return Verdict::Allowed;
        };
        if !policy.has_event(Event::Itemban)
            || !policy.item_is_banned(item)
            || has_bypass(participant, bypass::ITEMBAN)
        {
            return Verdict::Allowed;
        }

        participant.disable(&format!("using a banned item ({item})"));
        self.deny(
            participant,
            &policy,
            action::ITEM,
            &format!("You can't use {item} here."),
        )
    }

    /// Runs [`check_item_use`](Self::check_item_use) for a player update
    /// packet carrying the use-item bit, clearing the bit on denial.
    pub fn on_player_update(
        &self,
        participant: &dyn Participant,
        control: &mut ControlFlags,
        held_item: &str,
    ) -> Verdict {
        if !control.uses_item() {
            return Verdict::Allowed;
        }
        let verdict = self.check_item_use(participant, held_item);
        if verdict.is_denied() {
            control.clear_use_item();
        }
        verdict
    }

    /// Checks a request to set PvP to `requested`.
    ///
    /// On denial the participant's true PvP state is resent.
    pub fn check_pvp_toggle(&self, participant: &dyn Participant, requested: bool) -> Verdict {
        let Some(state) = self.engine.state(participant.id()) else {
            return Verdict::Allowed;
        };
        if !state.forced_pvp.contradicts(requested) && !state.pvp_toggle_locked {
            return Verdict::Allowed;
        }

        participant.resync_pvp();
        let reason = "You can't change your PvP status in this region!";
        participant.send_message(MessageKind::Error, reason);
        let region = state.current_region.unwrap_or_default();
        self.record_denial(participant, &region, action::PVP_TOGGLE, reason);
        Verdict::Denied(reason.to_string())
    }

    /// Checks whether the participant's region grants `permission`.
    #[must_use]
    pub fn check_permission_grant(
        &self,
        participant: &dyn Participant,
        permission: &str,
    ) -> PermissionOverride {
        let Some(policy) = self.engine.current_policy(participant.id()) else {
            return PermissionOverride::Defer;
        };
        if policy.has_event(Event::TempPerm)
            && policy.grants_permission(permission)
            && !has_bypass(participant, bypass::TEMPPERM)
        {
            PermissionOverride::Granted
        } else {
            PermissionOverride::Defer
        }
    }

    fn deny(
        &self,
        participant: &dyn Participant,
        policy: &RegionPolicy,
        action: &'static str,
        reason: &str,
    ) -> Verdict {
        participant.send_message(MessageKind::Error, reason);
        self.record_denial(participant, &policy.region, action, reason);
        Verdict::Denied(reason.to_string())
    }

    fn record_denial(
        &self,
        participant: &dyn Participant,
        region: &str,
        action: &'static str,
        reason: &str,
    ) {
        metrics::record_denial(action);
        debug!(participant = %participant.id(), region, action, "action denied");
        self.events.emit(EngineEvent::ActionDenied {
            timestamp: Utc::now(),
            participant: participant.id().0,
            region: region.to_string(),
            action,
            reason: reason.to_string(),
        });
    }
}
