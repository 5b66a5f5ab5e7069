//! Version information display.

use crate::cli::args::{OutputFormat, VersionArgs};
use crate::error::RegionTriggerError;

/// Print version and build information.
///
/// # Errors
///
/// Returns a JSON error if the JSON document cannot be encoded.
pub fn run(args: &VersionArgs) -> Result<(), RegionTriggerError> {
    let name = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    match args.format {
        OutputFormat::Human => println!("{name} {version}"),
        OutputFormat::Json => {
            let doc = serde_json::json!({
                "name": name,
                "version": version,
                "rust_version": env!("CARGO_PKG_RUST_VERSION"),
            });
            println!("{}", serde_json::to_string(&doc)?);
        }
    }
    Ok(())
}
