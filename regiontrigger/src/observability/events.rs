//! Structured event stream.
//!
//! Discrete, typed events emitted while the engine runs. Events are
//! serialized as newline-delimited JSON (JSONL) and carry a monotonically
//! increasing sequence number.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

/// A discrete event emitted by the engine.
///
/// Tagged with `"type"` when serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum EngineEvent {
    /// Enter effects ran for a participant.
    RegionEntered {
        /// When the transition was detected.
        timestamp: DateTime<Utc>,
        /// Participant id.
        participant: u32,
        /// Region entered.
        region: String,
    },

    /// Leave effects ran for a participant.
    RegionLeft {
        /// When the transition was detected.
        timestamp: DateTime<Utc>,
        /// Participant id.
        participant: u32,
        /// Region left.
        region: String,
    },

    /// An enforcement check vetoed an action.
    ActionDenied {
        /// When the check ran.
        timestamp: DateTime<Utc>,
        /// Participant id.
        participant: u32,
        /// Region whose policy denied the action.
        region: String,
        /// Action label (`tile`, `projectile`, `item`, `pvp_toggle`).
        action: &'static str,
        /// Reason shown to the participant.
        reason: String,
    },

    /// The policy table was reloaded from the backend.
    PoliciesReloaded {
        /// When the reload finished.
        timestamp: DateTime<Utc>,
        /// Number of policies loaded.
        count: usize,
    },

    /// An administrative command changed a policy.
    PolicyChanged {
        /// When the change was persisted.
        timestamp: DateTime<Utc>,
        /// Region whose policy changed.
        region: String,
        /// Canonical property name.
        property: &'static str,
        /// Whether the change was a deletion.
        deleted: bool,
    },
}

#[derive(Debug, Serialize)]
struct EventEnvelope {
    sequence: u64,
    #[serde(flatten)]
    event: EngineEvent,
}

/// Thread-safe, buffered JSONL event writer.
///
/// Serialization or I/O failures are silently dropped.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates an emitter that discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: EngineEvent) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(line) = serde_json::to_string(&envelope) {
            let mut w = self.writer.lock();
            let _ = writeln!(w, "{line}");
            let _ = w.flush();
        }
    }

    /// Number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::noop()
    }
}
