//! Recording participants and their directory.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use regiontrigger_core::TilePoint;
use serde::Serialize;

use crate::host::{MessageKind, Participant, ParticipantDirectory, ParticipantId};

/// One host-side effect applied to a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "effect")]
pub enum Effect {
    /// A chat line
    Message {
        /// Presentation
        kind: MessageKind,
        /// Text
        text: String,
    },
    /// Live PvP flag changed
    SetPvp {
        /// New value
        enabled: bool,
    },
    /// PvP flag announced to everyone
    BroadcastPvp,
    /// True PvP flag resent after a veto
    ResyncPvp,
    /// Killed
    Kill,
    /// Sent back to spawn
    Respawn,
    /// God mode changed
    GodMode {
        /// New value
        enabled: bool,
    },
    /// Temp group changed
    TempGroup {
        /// New group
        group: Option<String>,
    },
    /// Disabled for review
    Disabled {
        /// Logged reason
        reason: String,
    },
    /// Tile resent
    RestoreTile {
        /// Tile
        point: TilePoint,
    },
    /// Projectile removed
    RemoveProjectile {
        /// Projectile slot
        index: i32,
    },
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let on_off = |b: bool| if b { "on" } else { "off" };
        match self {
            Self::Message { kind, text } => write!(f, "message[{}] {text}", kind.as_str()),
            Self::SetPvp { enabled } => write!(f, "pvp {}", on_off(*enabled)),
            Self::BroadcastPvp => f.write_str("pvp broadcast"),
            Self::ResyncPvp => f.write_str("pvp resync"),
            Self::Kill => f.write_str("killed"),
            Self::Respawn => f.write_str("respawned"),
            Self::GodMode { enabled } => write!(f, "godmode {}", on_off(*enabled)),
            Self::TempGroup { group: Some(g) } => write!(f, "temp group {g}"),
            Self::TempGroup { group: None } => f.write_str("temp group cleared"),
            Self::Disabled { reason } => write!(f, "disabled ({reason})"),
            Self::RestoreTile { point } => write!(f, "tile restored at ({}, {})", point.x, point.y),
            Self::RemoveProjectile { index } => write!(f, "projectile {index} removed"),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    position: TilePoint,
    pvp: bool,
    god_mode: bool,
    temp_group: Option<String>,
    permissions: HashSet<String>,
    effects: Vec<Effect>,
    fail_messages: bool,
}

/// A participant that records every effect the engine applies.
#[derive(Debug)]
pub struct SimParticipant {
    id: ParticipantId,
    name: String,
    inner: Mutex<Inner>,
}

impl SimParticipant {
    /// Creates a participant at the origin with PvP off.
    pub fn new(id: ParticipantId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Moves the participant.
    pub fn set_position(&self, point: TilePoint) {
        self.inner.lock().position = point;
    }

    /// Grants a host permission.
    pub fn grant(&self, permission: &str) {
        self.inner
            .lock()
            .permissions
            .insert(permission.to_ascii_lowercase());
    }

    /// Sets the live PvP flag without recording an effect.
    pub fn init_pvp(&self, enabled: bool) {
        self.inner.lock().pvp = enabled;
    }

    /// Whether god mode is on.
    #[must_use]
    pub fn god_mode(&self) -> bool {
        self.inner.lock().god_mode
    }

    /// Fault injection for exercising tick isolation: while enabled, every
    /// `send_message` panics the way a dropped host connection would.
    pub fn fail_message_delivery(&self, enabled: bool) {
        self.inner.lock().fail_messages = enabled;
    }

    /// Every effect recorded so far.
    #[must_use]
    pub fn effects(&self) -> Vec<Effect> {
        self.inner.lock().effects.clone()
    }

    /// Drains the recorded effects.
    pub fn take_effects(&self) -> Vec<Effect> {
        std::mem::take(&mut self.inner.lock().effects)
    }

    /// Text of every recorded message.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.inner
            .lock()
            .effects
            .iter()
            .filter_map(|e| match e {
                Effect::Message { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, effect: Effect) {
        self.inner.lock().effects.push(effect);
    }
}

impl Participant for SimParticipant {
    fn id(&self) -> ParticipantId {
        self.id
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn position(&self) -> TilePoint {
        self.inner.lock().position
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.inner
            .lock()
            .permissions
            .contains(&permission.to_ascii_lowercase())
    }

    fn send_message(&self, kind: MessageKind, text: &str) {
        if self.inner.lock().fail_messages {
            panic!("injected fault: message delivery failed for {}", self.name);
        }
        self.record(Effect::Message {
            kind,
            text: text.to_string(),
        });
    }

    fn pvp(&self) -> bool {
        self.inner.lock().pvp
    }

    fn set_pvp(&self, enabled: bool) {
        self.inner.lock().pvp = enabled;
        self.record(Effect::SetPvp { enabled });
    }

    fn broadcast_pvp(&self) {
        self.record(Effect::BroadcastPvp);
    }

    fn resync_pvp(&self) {
        self.record(Effect::ResyncPvp);
    }

    fn kill(&self) {
        self.record(Effect::Kill);
    }

    fn respawn(&self) {
        self.record(Effect::Respawn);
    }

    fn set_god_mode(&self, enabled: bool) {
        self.inner.lock().god_mode = enabled;
        self.record(Effect::GodMode { enabled });
    }

    fn temp_group(&self) -> Option<String> {
        self.inner.lock().temp_group.clone()
    }

    fn set_temp_group(&self, group: Option<&str>) {
        let group = group.map(str::to_string);
        self.inner.lock().temp_group.clone_from(&group);
        self.record(Effect::TempGroup { group });
    }

    fn disable(&self, reason: &str) {
        self.record(Effect::Disabled {
            reason: reason.to_string(),
        });
    }

    fn restore_tile(&self, point: TilePoint) {
        self.record(Effect::RestoreTile { point });
    }

    fn remove_projectile(&self, index: i32) {
        self.record(Effect::RemoveProjectile { index });
    }
}

/// Directory of connected [`SimParticipant`]s.
#[derive(Debug, Default)]
pub struct SimDirectory {
    participants: RwLock<BTreeMap<ParticipantId, Arc<SimParticipant>>>,
}

impl SimDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a participant.
    pub fn insert(&self, participant: Arc<SimParticipant>) {
        self.participants
            .write()
            .insert(participant.id(), participant);
    }

    /// Removes a participant.
    pub fn remove(&self, id: ParticipantId) -> Option<Arc<SimParticipant>> {
        self.participants.write().remove(&id)
    }

    /// Looks up a participant with its concrete type.
    #[must_use]
    pub fn sim(&self, id: ParticipantId) -> Option<Arc<SimParticipant>> {
        self.participants.read().get(&id).cloned()
    }

    /// Every participant in id order.
    #[must_use]
    pub fn all(&self) -> Vec<Arc<SimParticipant>> {
        self.participants.read().values().cloned().collect()
    }
}

impl ParticipantDirectory for SimDirectory {
    fn active(&self) -> Vec<Arc<dyn Participant>> {
        self.participants
            .read()
            .values()
            .map(|p| Arc::clone(p) as Arc<dyn Participant>)
            .collect()
    }

    fn get(&self, id: ParticipantId) -> Option<Arc<dyn Participant>> {
        self.sim(id).map(|p| p as Arc<dyn Participant>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_effects_in_order() {
        let p = SimParticipant::new(ParticipantId(1), "alice");
        p.set_pvp(true);
        p.send_message(MessageKind::Info, "hi");
        p.kill();
        assert_eq!(
            p.take_effects(),
            vec![
                Effect::SetPvp { enabled: true },
                Effect::Message {
                    kind: MessageKind::Info,
                    text: "hi".to_string()
                },
                Effect::Kill,
            ]
        );
        assert!(p.effects().is_empty());
        assert!(p.pvp());
    }

    #[test]
    fn effect_display() {
        let msg = Effect::Message {
            kind: MessageKind::Warning,
            text: "careful".to_string(),
        };
        assert_eq!(msg.to_string(), "message[warning] careful");
        assert_eq!(Effect::SetPvp { enabled: false }.to_string(), "pvp off");
        assert_eq!(Effect::TempGroup { group: None }.to_string(), "temp group cleared");
    }

    #[test]
    fn permissions_ignore_case() {
        let p = SimParticipant::new(ParticipantId(1), "alice");
        p.grant("RegionTrigger.Bypass.Kill");
        assert!(p.has_permission("regiontrigger.bypass.kill"));
        assert!(!p.has_permission("regiontrigger.bypass.pvp"));
    }

    #[test]
    fn directory_lookup() {
        let dir = SimDirectory::new();
        dir.insert(Arc::new(SimParticipant::new(ParticipantId(2), "bob")));
        dir.insert(Arc::new(SimParticipant::new(ParticipantId(1), "alice")));
        let names: Vec<String> = dir.active().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["alice", "bob"]);
        assert!(dir.get(ParticipantId(2)).is_some());
        assert!(dir.remove(ParticipantId(2)).is_some());
        assert!(dir.get(ParticipantId(2)).is_none());
    }
}
