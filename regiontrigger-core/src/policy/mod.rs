//! Region policy data model
//!
//! - [`Event`] / [`EventSet`]: policy flags and their bitmask set
//! - [`RegionPolicy`]: the persisted trigger configuration of one region
//! - [`BanKind`]: selects one of the three ban lists

pub mod events;
pub mod schema;

pub use events::{Event, EventSet};
pub use schema::{BanKind, RegionPolicy};
