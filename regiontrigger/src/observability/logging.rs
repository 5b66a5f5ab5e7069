//! Logging setup
//!
//! All diagnostics go to stderr through one `tracing_subscriber::fmt`
//! subscriber; stdout carries command replies and transcripts only.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

use crate::cli::args::ColorChoice;

/// Overrides the directives derived from `-v`/`-q` when set.
pub const LOG_LEVEL_ENV: &str = "REGIONTRIGGER_LOG_LEVEL";

const CRATE_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Rendering of log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One line per record, colored on terminals
    #[default]
    Human,
    /// One JSON object per record
    Json,
}

/// The global flags that shape logging.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions {
    /// Record rendering
    pub format: LogFormat,
    /// Number of `-v` flags
    pub verbosity: u8,
    /// `-q`: errors only
    pub quiet: bool,
    /// ANSI color policy for [`LogFormat::Human`]
    pub color: ColorChoice,
}

impl LogOptions {
    /// Filter directives for these flags.
    ///
    /// One `-v` surfaces this crate's transition and denial records while
    /// dependencies stay at `warn`; two add debug detail; three trace
    /// everything.
    #[must_use]
    pub fn directives(&self) -> String {
        if self.quiet {
            return "error".to_string();
        }
        match self.verbosity {
            0 => "warn".to_string(),
            1 => format!("warn,{CRATE_TARGET}=info"),
            2 => format!("info,{CRATE_TARGET}=debug"),
            _ => "trace".to_string(),
        }
    }

    fn ansi(&self) -> bool {
        match self.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
            }
        }
    }
}

/// Installs the global subscriber.
///
/// A later call finds a subscriber already installed and leaves it alone.
pub fn init_logging(options: LogOptions) {
    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| EnvFilter::new(options.directives()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(options.verbosity >= 2);

    let installed = match options.format {
        LogFormat::Human => builder.with_ansi(options.ansi()).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if installed.is_err() {
        tracing::debug!("subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(verbosity: u8, quiet: bool) -> LogOptions {
        LogOptions {
            verbosity,
            quiet,
            ..LogOptions::default()
        }
    }

    #[test]
    fn directives_scale_with_verbosity() {
        assert_eq!(options(0, false).directives(), "warn");
        assert_eq!(options(1, false).directives(), "warn,regiontrigger=info");
        assert_eq!(options(2, false).directives(), "info,regiontrigger=debug");
        assert_eq!(options(9, false).directives(), "trace");
    }

    #[test]
    fn quiet_overrides_verbosity() {
        assert_eq!(options(3, true).directives(), "error");
    }

    #[test]
    fn explicit_color_choice_wins() {
        let mut opts = options(0, false);
        opts.color = ColorChoice::Always;
        assert!(opts.ansi());
        opts.color = ColorChoice::Never;
        assert!(!opts.ansi());
    }

    #[test]
    fn second_install_is_harmless() {
        init_logging(options(0, false));
        init_logging(LogOptions {
            format: LogFormat::Json,
            ..options(3, false)
        });
    }
}
