//! CLI argument definitions
//!
//! All Clap derive structs for `RegionTrigger` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

// ============================================================================
// Root CLI
// ============================================================================

/// Per-region behavioral policy engine for multiplayer game servers.
#[derive(Parser, Debug)]
#[command(name = "regiontrigger", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "REGIONTRIGGER_COLOR")]
    pub color: ColorChoice,

    /// Log format.
    #[arg(long, default_value = "human", global = true, env = "REGIONTRIGGER_LOG_FORMAT")]
    pub log_format: OutputFormat,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one administrative region command against a policy store.
    ///
    /// `--help` after the store options is passed through as the `/rt --help`
    /// pager; use `regiontrigger help exec` for this command's usage.
    #[command(disable_help_flag = true)]
    Exec(ExecArgs),

    /// Run a scripted session and print the effects participants received.
    Simulate(SimulateArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version and build information.
    Version(VersionArgs),
}

/// Files shared by every command that builds an engine.
#[derive(Args, Debug)]
pub struct EngineArgs {
    /// YAML world file (regions, groups, items).
    #[arg(short, long, env = "REGIONTRIGGER_WORLD")]
    pub world: PathBuf,

    /// JSON policy store; created on first write.
    #[arg(short, long, env = "REGIONTRIGGER_STORE")]
    pub store: PathBuf,

    /// YAML settings file.
    #[arg(long, env = "REGIONTRIGGER_SETTINGS")]
    pub settings: Option<PathBuf>,
}

/// Arguments for `exec`.
#[derive(Args, Debug)]
pub struct ExecArgs {
    /// World, store and settings.
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Output format for reply lines.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Command tokens, e.g. `set-e Arena pvp,godmode`.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub tokens: Vec<String>,
}

/// Arguments for `simulate`.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// World, store and settings.
    #[command(flatten)]
    pub engine: EngineArgs,

    /// YAML script of steps to run.
    #[arg(long)]
    pub script: PathBuf,

    /// Write structured JSONL events to this file.
    #[arg(long, env = "REGIONTRIGGER_EVENTS_FILE")]
    pub events_file: Option<PathBuf>,

    /// Expose Prometheus metrics on this port.
    #[arg(long, env = "REGIONTRIGGER_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

// ============================================================================
// Completions / Version
// ============================================================================

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

// ============================================================================
// Tests
// ============================================================================
