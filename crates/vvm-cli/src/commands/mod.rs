//! CLI command definitions and dispatch.

pub mod check;
pub mod list;
pub mod probe;
pub mod validate;

use clap::{Parser, Subcommand, ValueEnum};

/// VVM manifest validation and image acceptance checks.
#[derive(Parser, Debug)]
#[command(name = vvm_common::constants::APP_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Format of diagnostic logs written to stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Log output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse and validate a repository manifest.
    Validate(validate::ValidateArgs),
    /// List the repositories of a valid manifest in install order.
    List(list::ListArgs),
    /// Check whether the container engine is reachable.
    Probe(probe::ProbeArgs),
    /// Build the image and run the acceptance checklist inside it.
    Check(check::CheckArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Validate(args) => validate::execute(&args),
        Command::List(args) => list::execute(&args),
        Command::Probe(args) => probe::execute(&args),
        Command::Check(args) => check::execute(args),
    }
}
