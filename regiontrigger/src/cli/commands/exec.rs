//! `exec` command handler
//!
//! Runs one administrative command against the JSON policy store and
//! prints the reply lines.

use std::sync::Arc;

use crate::cli::args::{ExecArgs, OutputFormat};
use crate::cli::commands::build_engine;
use crate::command::ReplyLine;
use crate::error::RegionTriggerError;
use crate::host::MessageKind;
use crate::observability::EventEmitter;

/// Execute one command and print its replies.
///
/// # Errors
///
/// Returns [`RegionTriggerError::CommandRejected`] when the command replied
/// with an error line, or any error raised while building the engine.
pub fn run(args: &ExecArgs) -> Result<(), RegionTriggerError> {
    let (plugin, _host) = build_engine(&args.engine, Arc::new(EventEmitter::noop()))?;
    let replies = plugin.execute_command(&args.tokens);
    print_replies(&replies, args.format)?;

    match replies.iter().rfind(|r| r.kind == MessageKind::Error) {
        Some(rejected) => Err(RegionTriggerError::CommandRejected(rejected.text.clone())),
        None => Ok(()),
    }
}

fn print_replies(replies: &[ReplyLine], format: OutputFormat) -> Result<(), RegionTriggerError> {
    for reply in replies {
        match format {
            OutputFormat::Human => println!("{}", reply.text),
            OutputFormat::Json => println!("{}", serde_json::to_string(reply)?),
        }
    }
    Ok(())
}
