//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod completions;
pub mod exec;
pub mod simulate;
pub mod version;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::cli::args::{Cli, Commands, EngineArgs};
use crate::config::{Settings, load_settings};
use crate::error::RegionTriggerError;
use crate::observability::EventEmitter;
use crate::plugin::RegionTrigger;
use crate::sim::{SimHost, World};
use crate::store::JsonFileBackend;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<(), RegionTriggerError> {
    match cli.command {
        Commands::Exec(args) => exec::run(&args),
        Commands::Simulate(args) => simulate::run(&args, cancel).await,
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(())
        }
        Commands::Version(args) => version::run(&args),
    }
}

/// Loads the world, settings and store named by `args` and builds an
/// engine over the simulated host.
///
/// # Errors
///
/// Returns a config error for unreadable world or settings files and a
/// persistence error if the store cannot be loaded.
pub fn build_engine(
    args: &EngineArgs,
    events: Arc<EventEmitter>,
) -> Result<(RegionTrigger, SimHost), RegionTriggerError> {
    let settings = match &args.settings {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };
    let world = World::load(&args.world)?;
    tracing::info!(
        world = %args.world.display(),
        regions = world.regions.len(),
        "world loaded"
    );

    let host = SimHost::from_world(&world);
    let backend = Arc::new(JsonFileBackend::new(&args.store));
    let plugin = RegionTrigger::new(settings, host.services(), backend, events)?;
    Ok((plugin, host))
}
