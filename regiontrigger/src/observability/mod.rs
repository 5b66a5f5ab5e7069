//! Observability
//!
//! Logging, metrics, and the structured event stream for monitoring region
//! transitions and enforcement decisions.

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{EngineEvent, EventEmitter};
pub use logging::{LogFormat, LogOptions, init_logging};
pub use metrics::init_metrics;
