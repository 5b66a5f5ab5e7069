//! `RegionTrigger` - per-region behavioral policy engine
//!
//! Attaches behavior to named map regions on a multiplayer game server:
//! enter/leave messages, temporary groups and permissions, forced PvP,
//! god mode, private areas and tile/projectile/item bans. The engine
//! consumes the host through the traits in [`host`] and exposes its
//! hook handlers and administrative commands through [`plugin`].

pub mod cli;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod observability;
pub mod plugin;
pub mod selector;
pub mod sim;
pub mod store;

pub use plugin::{HostServices, RegionTrigger};
