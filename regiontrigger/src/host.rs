//! Host collaborator interfaces
//!
//! The engine never owns geometry, sessions or permissions. The host game
//! server provides them through the traits below, and drives the engine
//! through the hooks it registers via [`HookRegistry`].

use std::fmt;
use std::sync::Arc;

use regiontrigger_core::{RegionInfo, TilePoint};
use serde::{Deserialize, Serialize};

/// Stable identity of a connected participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(pub u32);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a chat line is presented to a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Operator-configured text, sent verbatim
    Plain,
    /// Informational notice
    Info,
    /// Confirmation of a completed operation
    Success,
    /// Something may not work as expected
    Warning,
    /// Denied or failed
    Error,
}

impl MessageKind {
    /// Lowercase label used in transcripts.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Point-containment queries against the host's region index.
pub trait SpatialIndex: Send + Sync {
    /// Every region whose geometry contains the tile at `point`.
    fn regions_at(&self, point: TilePoint) -> Vec<RegionInfo>;

    /// Looks up a region by exact name.
    fn region(&self, name: &str) -> Option<RegionInfo>;
}

/// The mutable surface of one connected participant.
///
/// All methods take `&self`; hosts keep their own interior locking.
/// Implementations may call back into the engine's enforcement checks
/// (for example from `has_permission`) while an engine call is running.
pub trait Participant: Send + Sync {
    /// Identity used to key per-participant state.
    fn id(&self) -> ParticipantId;

    /// Display name.
    fn name(&self) -> String;

    /// Current tile position.
    fn position(&self) -> TilePoint;

    /// Host permission check.
    fn has_permission(&self, permission: &str) -> bool;

    /// Sends a chat line to this participant.
    fn send_message(&self, kind: MessageKind, text: &str);

    /// The participant's live PvP flag.
    fn pvp(&self) -> bool;

    /// Sets the live PvP flag and resends it to the participant's client.
    fn set_pvp(&self, enabled: bool);

    /// Announces this participant's PvP flag to every other participant.
    fn broadcast_pvp(&self);

    /// Resends the true PvP flag after a vetoed toggle.
    fn resync_pvp(&self);

    /// Kills the participant.
    fn kill(&self);

    /// Relocates the participant to the default spawn point.
    fn respawn(&self);

    /// Enables or disables invulnerability.
    fn set_god_mode(&self, enabled: bool);

    /// The temporary permission group currently applied, if any.
    fn temp_group(&self) -> Option<String>;

    /// Applies or clears the temporary permission group.
    fn set_temp_group(&self, group: Option<&str>);

    /// Disables the participant and flags them for review.
    fn disable(&self, reason: &str);

    /// Resends the true contents of the tile at `point`.
    fn restore_tile(&self, point: TilePoint);

    /// Removes a projectile this participant spawned.
    fn remove_projectile(&self, index: i32);
}

/// Enumerates connected participants.
pub trait ParticipantDirectory: Send + Sync {
    /// Every currently active participant.
    fn active(&self) -> Vec<Arc<dyn Participant>>;

    /// Looks up one participant.
    fn get(&self, id: ParticipantId) -> Option<Arc<dyn Participant>>;
}

/// Resolves permission group names at enter time.
pub trait GroupResolver: Send + Sync {
    /// Canonical name of the group, or `None` if no such group exists.
    fn resolve(&self, name: &str) -> Option<String>;
}

/// An item known to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInfo {
    /// Numeric item id
    pub id: i32,
    /// Canonical display name
    pub name: String,
}

/// Looks up items for the `itemban` command.
pub trait ItemResolver: Send + Sync {
    /// All items matching `query` as an id or (partial) name.
    ///
    /// An exact name or id match returns exactly that item.
    fn find(&self, query: &str) -> Vec<ItemInfo>;
}

/// The host callbacks the engine subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    /// Per-frame update, throttled to the tick interval
    GameUpdate,
    /// A participant finished joining
    GreetParticipant,
    /// A participant disconnected
    ParticipantLeave,
    /// A tile edit packet
    TileEdit,
    /// A projectile spawn packet
    NewProjectile,
    /// A player update packet (carries the use-item control bit)
    PlayerUpdate,
    /// A PvP toggle request
    TogglePvp,
    /// A permission check
    PlayerPermission,
    /// A spatial region was removed
    RegionDeleted,
}

impl Hook {
    /// Every hook the engine needs, in registration order.
    pub const ALL: [Self; 9] = [
        Self::GameUpdate,
        Self::GreetParticipant,
        Self::ParticipantLeave,
        Self::TileEdit,
        Self::NewProjectile,
        Self::PlayerUpdate,
        Self::TogglePvp,
        Self::PlayerPermission,
        Self::RegionDeleted,
    ];
}

/// The host's callback registry.
pub trait HookRegistry {
    /// Starts routing `hook` to the engine.
    fn register(&mut self, hook: Hook);

    /// Stops routing `hook` to the engine.
    fn deregister(&mut self, hook: Hook);
}
