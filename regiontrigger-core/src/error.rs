//! Core error types for `RegionTrigger`
//!
//! Schema-level errors raised while interpreting policy values.

use thiserror::Error;

/// Errors raised while parsing or validating policy schema values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A policy flag name did not match any known flag
    #[error("unknown event '{name}'{}", suggestion.as_ref().map_or_else(String::new, |s| format!(" (did you mean '{s}'?)")))]
    UnknownEvent {
        /// The name as typed
        name: String,
        /// Closest known flag name, if one is close enough
        suggestion: Option<String>,
    },

    /// A ban kind name did not match `tile`, `projectile` or `item`
    #[error("unknown ban kind '{0}'")]
    UnknownBanKind(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_event_display_with_suggestion() {
        let err = SchemaError::UnknownEvent {
            name: "pvpp".to_string(),
            suggestion: Some("pvp".to_string()),
        };
        assert_eq!(err.to_string(), "unknown event 'pvpp' (did you mean 'pvp'?)");
    }

    #[test]
    fn unknown_event_display_without_suggestion() {
        let err = SchemaError::UnknownEvent {
            name: "zzzzzzzz".to_string(),
            suggestion: None,
        };
        assert_eq!(err.to_string(), "unknown event 'zzzzzzzz'");
    }
}
