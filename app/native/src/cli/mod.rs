//! CLI module for Veil.
//!
//! Commands work on the pin file, the configuration and the in-memory status
//! bar; none of them need a running engine.

mod commands;
mod output;

use clap::Parser;
pub use commands::Cli;

use crate::error::VeilError;

/// Parses command-line arguments and executes the selected command.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run() -> Result<(), VeilError> { Cli::parse().execute() }
