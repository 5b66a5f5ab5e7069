//! `RegionTrigger`: per-region behavioral policy engine

use clap::Parser;
use tokio_util::sync::CancellationToken;

use regiontrigger::cli::args::{Cli, OutputFormat};
use regiontrigger::cli::commands;
use regiontrigger::error::ExitCode;
use regiontrigger::observability::{LogFormat, LogOptions, init_logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(LogOptions {
        format: match cli.log_format {
            OutputFormat::Human => LogFormat::Human,
            OutputFormat::Json => LogFormat::Json,
        },
        verbosity: cli.verbose,
        quiet: cli.quiet,
        color: cli.color,
    });

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();

    // First signal cancels the running command; a second one forces exit.
    tokio::spawn(async move {
        let Ok(mut sigterm) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        else {
            return;
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }

        eprintln!("\nShutting down gracefully... (press Ctrl+C again to force)");
        signal_cancel.cancel();

        tokio::select! {
            _ = tokio::signal::ctrl_c() => std::process::exit(ExitCode::INTERRUPTED),
            _ = sigterm.recv() => std::process::exit(ExitCode::TERMINATED),
        }
    });

    match commands::dispatch(cli, cancel).await {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
