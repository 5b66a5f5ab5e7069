//! Settings file loading and duration parsing.

use std::path::Path;
use std::time::Duration;

use super::Settings;
use crate::error::ConfigError;

/// Loads and validates settings from `path`.
///
/// An empty document yields the defaults.
///
/// # Errors
///
/// - [`ConfigError::MissingFile`] if `path` does not exist
/// - [`ConfigError::ParseError`] for malformed YAML or unknown fields
/// - [`ConfigError::InvalidValue`] for out-of-range values
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
        path: path.to_path_buf(),
    })?;

    if raw.trim().is_empty() {
        return Ok(Settings::default());
    }

    let settings: Settings = serde_yaml::from_str(&raw).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        line: e.location().map(|l| l.line()),
        message: e.to_string(),
    })?;

    settings.validate()?;
    tracing::debug!(path = %path.display(), ?settings, "settings loaded");
    Ok(settings)
}

/// Parses a duration string with a unit suffix.
///
/// Supported suffixes: `ms` (milliseconds), `s` (seconds), `m` (minutes),
/// `h` (hours).
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if the string has no recognized
/// suffix or the number is not a non-negative integer.
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let s = s.trim();
    let bad = || ConfigError::InvalidValue {
        field: "tick_interval".to_string(),
        value: s.to_string(),
        expected: "a duration with suffix ms, s, m or h".to_string(),
    };
    let number = |digits: &str| digits.trim().parse::<u64>().map_err(|_| bad());

    if let Some(ms) = s.strip_suffix("ms") {
        return Ok(Duration::from_millis(number(ms)?));
    }
    if let Some(hours) = s.strip_suffix('h') {
        return Ok(Duration::from_secs(number(hours)?.saturating_mul(3600)));
    }
    if let Some(mins) = s.strip_suffix('m') {
        return Ok(Duration::from_secs(number(mins)?.saturating_mul(60)));
    }
    if let Some(secs) = s.strip_suffix('s') {
        return Ok(Duration::from_secs(number(secs)?));
    }
    Err(bad())
}
