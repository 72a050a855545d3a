//! CLI command definitions and dispatch.

pub mod replay;
pub mod status;

use clap::{Parser, Subcommand};
use podwatch_common::constants::BIN_NAME;

/// podwatch — pod status synthesis and change notification.
#[derive(Parser, Debug)]
#[command(name = BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay recorded pod events and emit one JSON change record per line.
    Replay(replay::ReplayArgs),
    /// Print the synthesized status of a single pod snapshot.
    Status(status::StatusArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Replay(args) => replay::execute(args),
        Command::Status(args) => status::execute(&args),
    }
}
