//! Command-line interface
//!
//! Argument definitions and command handlers for the `regiontrigger`
//! binary.

pub mod args;
pub mod commands;
