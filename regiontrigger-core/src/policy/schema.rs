//! Region policy record
//!
//! One [`RegionPolicy`] exists per configured region. Policies are plain
//! values: the store publishes a rebuilt copy on every change instead of
//! mutating a shared instance.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::events::{Event, EventSet};
use crate::error::SchemaError;

/// Which ban list a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BanKind {
    /// Tile type ids
    Tile,
    /// Projectile type ids
    Projectile,
    /// Canonical item names
    Item,
}

impl BanKind {
    /// The flag that activates this ban list.
    #[must_use]
    pub const fn event(self) -> Event {
        match self {
            Self::Tile => Event::Tileban,
            Self::Projectile => Event::Projban,
            Self::Item => Event::Itemban,
        }
    }
}

impl fmt::Display for BanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tile => "tile",
            Self::Projectile => "projectile",
            Self::Item => "item",
        })
    }
}

impl FromStr for BanKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tile" => Ok(Self::Tile),
            "projectile" | "proj" => Ok(Self::Projectile),
            "item" => Ok(Self::Item),
            _ => Err(SchemaError::UnknownBanKind(s.to_string())),
        }
    }
}

/// Trigger configuration of a single region.
///
/// Optional text fields distinguish "not configured" (`None`) from
/// "configured as empty" (`Some(String::new())`), and the persisted form
/// keeps that distinction by omitting absent fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RegionPolicy {
    /// Region name, the identity key
    pub region: String,

    /// Enabled behaviors
    #[serde(default)]
    pub events: EventSet,

    /// Banned tile type ids
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tile_bans: BTreeSet<u16>,

    /// Banned projectile type ids
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub projectile_bans: BTreeSet<u16>,

    /// Banned item names
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub item_bans: BTreeSet<String>,

    /// Text sent on entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enter_message: Option<String>,

    /// Text sent on exit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave_message: Option<String>,

    /// Ambient text repeated while occupied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Ambient message repeat cadence in seconds (0 disables repetition)
    #[serde(default)]
    pub message_interval: u32,

    /// Temporary permission group applied while inside
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_group: Option<String>,

    /// Permissions granted while inside (lower-case)
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub temp_permissions: BTreeSet<String>,
}

impl RegionPolicy {
    /// Creates an empty policy for `region`.
    #[must_use]
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Self::default()
        }
    }

    /// Returns whether `event` is enabled.
    #[must_use]
    pub const fn has_event(&self, event: Event) -> bool {
        self.events.contains(event)
    }

    /// Returns whether tile `id` is banned.
    #[must_use]
    pub fn tile_is_banned(&self, id: u16) -> bool {
        self.tile_bans.contains(&id)
    }

    /// Returns whether projectile `id` is banned.
    #[must_use]
    pub fn projectile_is_banned(&self, id: u16) -> bool {
        self.projectile_bans.contains(&id)
    }

    /// Returns whether `item` is banned.
    ///
    /// Item names compare case-insensitively.
    #[must_use]
    pub fn item_is_banned(&self, item: &str) -> bool {
        self.item_bans.iter().any(|banned| banned.eq_ignore_ascii_case(item))
    }

    /// Returns whether `permission` is granted while inside.
    #[must_use]
    pub fn grants_permission(&self, permission: &str) -> bool {
        self.temp_permissions.contains(&permission.to_ascii_lowercase())
    }

    /// The ambient message, when one is set and not blank.
    #[must_use]
    pub fn ambient_message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }

    /// Ban list entries of `kind` rendered as strings, in order.
    #[must_use]
    pub fn bans(&self, kind: BanKind) -> Vec<String> {
        match kind {
            BanKind::Tile => self.tile_bans.iter().map(ToString::to_string).collect(),
            BanKind::Projectile => self
                .projectile_bans
                .iter()
                .map(ToString::to_string)
                .collect(),
            BanKind::Item => self.item_bans.iter().cloned().collect(),
        }
    }
}
