//! Engine settings
//!
//! Settings are read from an optional YAML file. Every field has a default,
//! so an empty or partial document is valid.

mod loader;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::selector::TieBreak;

pub use loader::{load_settings, parse_duration};

/// Tick cadence used when `tick_interval` is not set.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Top-level engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// How often participant regions are re-evaluated (`ms`, `s`, `m`, `h` suffix)
    pub tick_interval: String,

    /// Upper bounds for ban ids
    pub limits: Limits,

    /// Overlapping-region resolution
    pub selection: Selection,

    /// Command help output
    pub help: HelpSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_interval: "1s".to_string(),
            limits: Limits::default(),
            selection: Selection::default(),
            help: HelpSettings::default(),
        }
    }
}

impl Settings {
    /// The parsed tick interval, or the default when it does not parse.
    ///
    /// [`load_settings`] rejects unparseable intervals, so loaded settings
    /// always return the configured value.
    #[must_use]
    pub fn tick_duration(&self) -> Duration {
        parse_duration(&self.tick_interval).unwrap_or(DEFAULT_TICK_INTERVAL)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match parse_duration(&self.tick_interval) {
            Ok(d) if d.is_zero() => {
                return Err(invalid("tick_interval", &self.tick_interval, "a non-zero duration"));
            }
            Ok(_) => {}
            Err(e) => return Err(e),
        }
        if self.limits.max_tile_types == 0 {
            return Err(invalid("limits.max_tile_types", "0", "a positive integer"));
        }
        if self.limits.max_projectile_types <= 1 {
            return Err(invalid(
                "limits.max_projectile_types",
                &self.limits.max_projectile_types.to_string(),
                "an integer greater than 1",
            ));
        }
        if self.help.page_size == 0 {
            return Err(invalid("help.page_size", "0", "a positive integer"));
        }
        Ok(())
    }
}

fn invalid(field: &str, value: &str, expected: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        expected: expected.to_string(),
    }
}

/// Valid id ranges for the numeric ban lists.
///
/// Tile ids are valid in `0..max_tile_types`, projectile ids in
/// `1..max_projectile_types`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    /// Number of tile types the world knows
    pub max_tile_types: u16,
    /// Number of projectile types the world knows
    pub max_projectile_types: u16,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_tile_types: 470,
            max_projectile_types: 714,
        }
    }
}

/// Overlapping-region resolution settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Selection {
    /// Area ordering among equal-priority regions
    pub tie_break: TieBreak,
}

/// Help output settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HelpSettings {
    /// Lines per help page
    pub page_size: usize,
}

impl Default for HelpSettings {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}
