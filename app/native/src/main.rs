#![allow(clippy::multiple_crate_versions)]

//! Veil - status bar icon hiding engine.
//!
//! The binary exposes the engine's offline tooling: pin management, zone
//! classification and dry-run moves against an in-memory status bar.

use tracing_subscriber::EnvFilter;
use veil_lib::constants::LOG_ENV_VAR;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = veil_lib::cli::run() {
        eprintln!("veil: {err}");
        std::process::exit(1);
    }
}
