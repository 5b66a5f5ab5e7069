//! `completions` command handler

use clap::CommandFactory;

use crate::cli::args::{Cli, CompletionsArgs};

/// Writes the completion script for `args.shell` to stdout.
pub fn run(args: &CompletionsArgs) {
    let mut command = Cli::command();
    let bin = command.get_name().to_string();
    clap_complete::generate(args.shell, &mut command, bin, &mut std::io::stdout());
}
