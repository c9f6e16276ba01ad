//! CLI command definitions using Clap.
//!
//! Commands are organized into submodules:
//!
//! - `classify` - Zone classification of a single icon span
//! - `config_cmd` - Configuration file management
//! - `pins` - Always-hidden pin management
//! - `simulate` - Dry-run moves on the in-memory status bar
//! - `types` - Shared argument types

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::error::VeilError;
use crate::menubar::JsonPinStore;
use crate::{config, schema};

pub mod classify;
pub mod config_cmd;
pub mod pins;
pub mod simulate;
pub mod types;

pub use classify::ClassifyArgs;
pub use config_cmd::ConfigCommands;
pub use pins::PinsCommands;
pub use simulate::SimulateArgs;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Veil CLI - hide status bar icons behind a movable separator.
#[derive(Parser, Debug)]
#[command(name = "veil")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Path to the pin file.
    ///
    /// Defaults to `pins.json` in the application data directory.
    #[arg(long, global = true, value_name = "PATH")]
    pub pins_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Always-hidden pin management commands.
    ///
    /// Pins name icons that are kept in the always-hidden zone.
    #[command(subcommand)]
    Pins(PinsCommands),

    /// Classify an icon span against separator positions.
    Classify(ClassifyArgs),

    /// Run a single move against an in-memory status bar.
    ///
    /// Exercises targeting, verification and retry without touching the
    /// real status bar.
    Simulate(SimulateArgs),

    /// Configuration file management commands.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Output Veil configuration JSON Schema.
    ///
    /// Can be redirected to a file for use with editors that support JSON
    /// Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Usage:
    ///   eval "$(veil completions --shell zsh)"
    ///   veil completions --shell fish > ~/.config/fish/completions/veil.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Returns the custom config path if specified via --config flag.
    #[must_use]
    pub fn config_path(&self) -> Option<PathBuf> { self.config.as_ref().map(PathBuf::from) }

    /// Pin store selected by `--pins-file`, or the default location.
    #[must_use]
    pub fn pin_store(&self) -> JsonPinStore {
        self.pins_file.clone().map_or_else(JsonPinStore::at_default_path, JsonPinStore::new)
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), VeilError> {
        if let Some(path) = self.config_path() {
            if !path.exists() {
                return Err(VeilError::ConfigError(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            config::set_custom_config_path(path);
        }

        match &self.command {
            Commands::Pins(cmd) => pins::execute(cmd, &self.pin_store()),
            Commands::Classify(args) => classify::execute(args),
            Commands::Simulate(args) => simulate::execute(args),
            Commands::Config(cmd) => config_cmd::execute(cmd),

            Commands::Schema => {
                println!("{}", schema::print_schema());
                Ok(())
            }

            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, "veil", &mut io::stdout());
    }
}

#[cfg(test)]
mod tests {
    use super::types::CliZone;
    use super::*;

    // ========================================================================
    // CLI parsing tests
    // ========================================================================

    #[test]
    fn test_cli_definition_is_valid() { Cli::command().debug_assert(); }

    #[test]
    fn test_cli_parses_schema() {
        let cli = Cli::try_parse_from(["veil", "schema"]).unwrap();
        assert!(matches!(cli.command, Commands::Schema));
    }

    #[test]
    fn test_cli_parses_completions() {
        let cli = Cli::try_parse_from(["veil", "completions", "--shell", "zsh"]).unwrap();
        match cli.command {
            Commands::Completions { shell } => assert_eq!(shell, Shell::Zsh),
            _ => panic!("Expected Completions command"),
        }
    }

    #[test]
    fn test_cli_parses_pins_add() {
        let cli =
            Cli::try_parse_from(["veil", "pins", "add", "com.example.app::axid:clock"]).unwrap();
        match cli.command {
            Commands::Pins(PinsCommands::Add { pin }) => {
                assert_eq!(pin, "com.example.app::axid:clock");
            }
            _ => panic!("Expected Pins Add command"),
        }
    }

    #[test]
    fn test_cli_parses_pins_list_json() {
        let cli = Cli::try_parse_from(["veil", "pins", "list", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Pins(PinsCommands::List { json: true })));
    }

    #[test]
    fn test_cli_parses_classify_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "veil",
            "classify",
            "--x",
            "-40",
            "--width",
            "22",
            "--separator",
            "600",
        ])
        .unwrap();
        match cli.command {
            Commands::Classify(args) => {
                assert!((args.x + 40.0).abs() < f64::EPSILON);
                assert!(args.always_hidden.is_none());
            }
            _ => panic!("Expected Classify command"),
        }
    }

    #[test]
    fn test_cli_parses_simulate() {
        let cli = Cli::try_parse_from([
            "veil",
            "simulate",
            "--to",
            "always-hidden",
            "--hidden",
            "--ignore-drags",
            "1",
        ])
        .unwrap();
        match cli.command {
            Commands::Simulate(args) => {
                assert_eq!(args.to, CliZone::AlwaysHidden);
                assert!(args.hidden);
                assert_eq!(args.ignore_drags, 1);
            }
            _ => panic!("Expected Simulate command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_zone() {
        assert!(Cli::try_parse_from(["veil", "simulate", "--to", "nowhere"]).is_err());
    }

    #[test]
    fn test_app_version_is_not_empty() {
        assert!(!APP_VERSION.is_empty());
    }

    // ========================================================================
    // Global flag tests
    // ========================================================================

    #[test]
    fn test_cli_parses_config_flag() {
        let cli =
            Cli::try_parse_from(["veil", "--config", "/path/to/config.json", "schema"]).unwrap();
        assert_eq!(cli.config, Some("/path/to/config.json".to_string()));
        assert_eq!(cli.config_path(), Some(PathBuf::from("/path/to/config.json")));
    }

    #[test]
    fn test_cli_parses_pins_file_after_subcommand() {
        let cli =
            Cli::try_parse_from(["veil", "pins", "path", "--pins-file", "/tmp/pins.json"]).unwrap();
        assert_eq!(cli.pin_store().path(), std::path::Path::new("/tmp/pins.json"));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["veil"]).is_err());
    }
}
