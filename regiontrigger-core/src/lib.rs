//! `RegionTrigger` Core: shared policy types
//!
//! This crate provides the region policy data model and the schema error
//! types shared by the `regiontrigger` engine, its command processor and
//! the persistence backends.

pub mod error;
pub mod policy;
pub mod region;

pub use error::SchemaError;
pub use policy::{BanKind, Event, EventSet, RegionPolicy};
pub use region::{RegionInfo, TilePoint};
