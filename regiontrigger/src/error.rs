//! Error types for `RegionTrigger`
//!
//! Configuration errors raised at the command boundary, persistence
//! failures raised by the policy store, and settings-file errors raised
//! while starting the engine. The top-level [`RegionTriggerError`]
//! aggregates them for the CLI and maps each to an exit code.

use std::path::PathBuf;

use regiontrigger_core::{BanKind, SchemaError};
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `RegionTrigger` CLI operations.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Settings or world file error (invalid YAML, invalid value)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Policy store could not be read or written
    pub const PERSISTENCE_ERROR: i32 = 4;

    /// Administrative command rejected
    pub const POLICY_ERROR: i32 = 5;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `RegionTrigger` operations.
#[derive(Debug, Error)]
pub enum RegionTriggerError {
    /// Settings or world file error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Rejected policy operation
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// Policy store failure
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// An administrative command replied with an error line
    #[error("command rejected: {0}")]
    CommandRejected(String),
}

impl RegionTriggerError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Policy(_) | Self::CommandRejected(_) => ExitCode::POLICY_ERROR,
            Self::Persistence(_) | Self::Json(_) => ExitCode::PERSISTENCE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Settings Errors
// ============================================================================

/// Settings and world file loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}{}: {message}", line.map_or_else(String::new, |l| format!(" (line {l})")))]
    ParseError {
        /// Path to the file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Referenced file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },
}

// ============================================================================
// Policy Errors
// ============================================================================

/// Rejected policy operations.
///
/// These are always recovered at the command boundary and reported to
/// the operator as a single line.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The region does not exist in the spatial index
    #[error("Invalid region!")]
    RegionNotFound(String),

    /// A ban id is outside the valid range for its kind
    #[error("Invalid {kind} ID!")]
    InvalidId {
        /// Ban list the id was meant for
        kind: BanKind,
        /// The value as typed
        value: String,
    },

    /// No item matched the name or id
    #[error("Invalid item.")]
    UnknownItem(String),

    /// More than one item matched the name
    #[error("More than one match found: {}", candidates.join(", "))]
    AmbiguousItem {
        /// The name as typed
        query: String,
        /// Every matching item name
        candidates: Vec<String>,
    },

    /// The message interval was not an integer >= 0
    #[error("Invalid interval. (Interval must be integer >= 0)")]
    InvalidInterval(String),

    /// The property alias is not in the alias table
    #[error("Invalid property!")]
    UnknownProperty(String),

    /// The command line did not match the expected shape
    #[error("{0}")]
    Syntax(String),

    /// One or more flag names were not recognized
    #[error("Invalid events: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
    UnknownEvents(Vec<SchemaError>),

    /// The store rejected the write
    #[error("{0}")]
    Persistence(#[from] PersistenceError),
}

// ============================================================================
// Persistence Errors
// ============================================================================

/// Policy store read/write failures.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// I/O error while reading or writing the store
    #[error("policy store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored document could not be encoded or decoded
    #[error("policy store encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// The store is not reachable
    #[error("policy store unavailable: {0}")]
    Unavailable(String),
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `RegionTrigger` operations.
pub type Result<T> = std::result::Result<T, RegionTriggerError>;

// ============================================================================
// Tests
// ============================================================================
