//! `simulate` command handler
//!
//! Runs a scripted session through the engine on the simulated host and
//! prints the transcript of host effects.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::cli::args::SimulateArgs;
use crate::cli::commands::build_engine;
use crate::error::RegionTriggerError;
use crate::observability::EventEmitter;
use crate::sim::{Script, SimHooks, run_script};

/// Run the script named by `args`.
///
/// # Errors
///
/// Returns a config error for unreadable world, settings or script files,
/// an I/O error if the events file cannot be created or the metrics
/// endpoint cannot bind, and a config error when a step names a
/// participant that has not joined.
pub async fn run(args: &SimulateArgs, cancel: CancellationToken) -> Result<(), RegionTriggerError> {
    if let Some(port) = args.metrics_port {
        crate::observability::init_metrics(Some(port))?;
        tracing::info!(port, "Prometheus metrics endpoint started");
    }

    let events = match &args.events_file {
        Some(path) => Arc::new(EventEmitter::from_file(path)?),
        None => Arc::new(EventEmitter::noop()),
    };

    let script = Script::load(&args.script)?;
    let (plugin, host) = build_engine(&args.engine, events)?;

    let mut hooks = SimHooks::default();
    plugin.initialize(&mut hooks);
    tracing::info!(
        steps = script.steps.len(),
        hooks = hooks.registered().len(),
        "running script"
    );

    let worker = tokio::task::spawn_blocking(move || {
        let transcript = run_script(&plugin, &host, &script);
        (plugin, transcript)
    });

    let (plugin, transcript) = tokio::select! {
        () = cancel.cancelled() => {
            tracing::warn!("simulation interrupted");
            return Ok(());
        }
        joined = worker => joined.map_err(|e| RegionTriggerError::Io(std::io::Error::other(e)))?,
    };

    plugin.dispose(&mut hooks);

    for line in transcript? {
        println!("{line}");
    }
    Ok(())
}
