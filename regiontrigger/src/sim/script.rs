//! Scripted sessions
//!
//! A script is a YAML list of steps run in order against a
//! [`RegionTrigger`] bound to a [`SimHost`]. After every step the effects
//! each participant received are drained into the transcript.

use std::path::Path;
use std::sync::Arc;

use regiontrigger_core::TilePoint;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::SimHost;
use super::participant::SimParticipant;
use crate::engine::{ControlFlags, PermissionOverride, Verdict};
use crate::error::ConfigError;
use crate::host::{Participant, ParticipantId};
use crate::plugin::RegionTrigger;

/// A scripted session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Script {
    /// Steps in execution order
    pub steps: Vec<Step>,
}

/// One scripted host event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// A participant connects
    Join {
        /// Participant id
        id: u32,
        /// Display name; defaults to `player<id>`
        #[serde(default)]
        name: Option<String>,
        /// Starting column
        #[serde(default)]
        x: i32,
        /// Starting row
        #[serde(default)]
        y: i32,
        /// Host permissions held
        #[serde(default)]
        permissions: Vec<String>,
        /// Initial PvP flag
        #[serde(default)]
        pvp: bool,
    },
    /// A participant disconnects
    Leave {
        /// Participant id
        id: u32,
    },
    /// A participant moves to a tile
    Move {
        /// Participant id
        id: u32,
        /// Column
        x: i32,
        /// Row
        y: i32,
    },
    /// Run this many ticks
    Tick(u32),
    /// A tile edit
    PlaceTile {
        /// Participant id
        id: u32,
        /// Column
        x: i32,
        /// Row
        y: i32,
        /// Tile type
        tile: u16,
    },
    /// A projectile spawn
    Projectile {
        /// Owner id
        id: u32,
        /// Projectile slot
        index: i32,
        /// Projectile type
        #[serde(rename = "type")]
        kind: u16,
    },
    /// A player update while holding `item`
    UseItem {
        /// Participant id
        id: u32,
        /// Held item name
        item: String,
    },
    /// A PvP toggle request
    TogglePvp {
        /// Participant id
        id: u32,
        /// Requested value
        enabled: bool,
    },
    /// A permission check
    CheckPermission {
        /// Participant id
        id: u32,
        /// Permission node
        permission: String,
    },
    /// An administrative command line, without the `/rt` prefix
    Command(String),
    /// A spatial region is removed from the world
    DeleteRegion(String),
}

impl Script {
    /// Reads a YAML script file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingFile`] or [`ConfigError::ParseError`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        Self::parse(&raw, path)
    }

    /// Parses YAML script text; `path` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] for malformed YAML.
    pub fn parse(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })
    }
}

/// Runs `script` and returns the transcript.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] when a step names a participant
/// that has not joined.
pub fn run_script(
    plugin: &RegionTrigger,
    host: &SimHost,
    script: &Script,
) -> Result<Vec<String>, ConfigError> {
    let mut transcript = Vec::new();

    for (n, step) in script.steps.iter().enumerate() {
        debug!(step = n, ?step, "running script step");
        let lines = run_step(plugin, host, n, step)?;
        transcript.extend(lines);

        for participant in host.directory.all() {
            for effect in participant.take_effects() {
                transcript.push(format!(
                    "  {} {}: {effect}",
                    participant.id(),
                    participant.name()
                ));
            }
        }
    }

    Ok(transcript)
}

fn run_step(
    plugin: &RegionTrigger,
    host: &SimHost,
    n: usize,
    step: &Step,
) -> Result<Vec<String>, ConfigError> {
    let lookup = |id: u32| -> Result<Arc<SimParticipant>, ConfigError> {
        host.directory
            .sim(ParticipantId(id))
            .ok_or_else(|| ConfigError::InvalidValue {
                field: format!("steps[{n}].id"),
                value: id.to_string(),
                expected: "a participant that has joined".to_string(),
            })
    };

    let lines = match step {
        Step::Join {
            id,
            name,
            x,
            y,
            permissions,
            pvp,
        } => {
            let name = name.clone().unwrap_or_else(|| format!("player{id}"));
            let participant = Arc::new(SimParticipant::new(ParticipantId(*id), name.as_str()));
            participant.set_position(TilePoint::new(*x, *y));
            participant.init_pvp(*pvp);
            for permission in permissions {
                participant.grant(permission);
            }
            host.directory.insert(participant);
            plugin.on_participant_join(ParticipantId(*id));
            vec![format!("> join #{id} {name} at ({x}, {y})")]
        }
        Step::Leave { id } => {
            let participant = lookup(*id)?;
            host.directory.remove(participant.id());
            plugin.on_participant_leave(participant.id());
            vec![format!("> leave #{id}")]
        }
        Step::Move { id, x, y } => {
            lookup(*id)?.set_position(TilePoint::new(*x, *y));
            vec![format!("> move #{id} to ({x}, {y})")]
        }
        Step::Tick(count) => {
            let mut transitions = 0;
            for _ in 0..*count {
                transitions += plugin.tick().transitions;
            }
            vec![format!("> tick x{count} ({transitions} transitions)")]
        }
        Step::PlaceTile { id, x, y, tile } => {
            let participant = lookup(*id)?;
            let verdict = plugin.check_tile_placement(participant.as_ref(), *x, *y, *tile);
            vec![format!(
                "> place tile {tile} at ({x}, {y}) by #{id}: {}",
                verdict_label(&verdict)
            )]
        }
        Step::Projectile { id, index, kind } => {
            let participant = lookup(*id)?;
            let verdict = plugin.check_projectile_create(participant.as_ref(), *index, *kind);
            vec![format!(
                "> projectile {kind} by #{id}: {}",
                verdict_label(&verdict)
            )]
        }
        Step::UseItem { id, item } => {
            let participant = lookup(*id)?;
            let mut control = ControlFlags(ControlFlags::USE_ITEM);
            let verdict = plugin.on_player_update(participant.as_ref(), &mut control, item);
            vec![format!(
                "> use {item} by #{id}: {}",
                verdict_label(&verdict)
            )]
        }
        Step::TogglePvp { id, enabled } => {
            let participant = lookup(*id)?;
            let verdict = plugin.check_pvp_toggle(participant.as_ref(), *enabled);
            vec![format!(
                "> toggle pvp {} by #{id}: {}",
                if *enabled { "on" } else { "off" },
                verdict_label(&verdict)
            )]
        }
        Step::CheckPermission { id, permission } => {
            let participant = lookup(*id)?;
            let outcome = match plugin.check_permission_grant(participant.as_ref(), permission) {
                PermissionOverride::Granted => "granted",
                PermissionOverride::Defer => "deferred",
            };
            vec![format!("> permission {permission} for #{id}: {outcome}")]
        }
        Step::Command(line) => {
            let mut lines = vec![format!("> /rt {line}")];
            lines.extend(
                plugin
                    .execute_line(line)
                    .into_iter()
                    .map(|reply| format!("  [{}] {}", reply.kind.as_str(), reply.text)),
            );
            lines
        }
        Step::DeleteRegion(region) => {
            host.index.remove(region);
            plugin.on_region_deleted(region);
            vec![format!("> delete region {region}")]
        }
    };

    Ok(lines)
}

fn verdict_label(verdict: &Verdict) -> &'static str {
    match verdict {
        Verdict::Allowed => "allowed",
        Verdict::Denied(_) => "denied",
    }
}
