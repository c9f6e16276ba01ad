//! Config CLI commands.
//!
//! Commands for managing the Veil configuration file.

use std::path::PathBuf;

use clap::Subcommand;
use colored::Colorize;

use crate::cli::output;
use crate::config::template::{create_config_file, generate_config_template};
use crate::config::{config_paths, get_config, get_config_path};
use crate::error::VeilError;

/// Config management commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Initialize a new configuration file with all options documented.
    ///
    /// Every option is written commented out, so the file starts out
    /// equivalent to the defaults.
    #[command(
        name = "init",
        after_long_help = r#"Examples:
  veil config init              # Create config at default location
  veil config init --force      # Overwrite existing config
  veil config init --path ~/veil.jsonc
  veil config init --stdout     # Print template to stdout"#
    )]
    Init {
        /// Overwrite existing configuration file if it exists.
        #[arg(long, short)]
        force: bool,

        /// Custom path for the configuration file.
        /// If not specified, uses ~/.config/veil/config.jsonc
        #[arg(long, short, value_name = "PATH")]
        path: Option<PathBuf>,

        /// Print the configuration template to stdout instead of writing to a file.
        #[arg(long)]
        stdout: bool,
    },

    /// Print the effective configuration as JSON.
    Show,

    /// Show the configuration file search paths.
    Path,
}

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cmd: &ConfigCommands) -> Result<(), VeilError> {
    match cmd {
        ConfigCommands::Init { stdout: true, .. } => {
            println!("{}", generate_config_template());
            Ok(())
        }
        ConfigCommands::Init { force, path, stdout: false } => init_config(*force, path.clone()),
        ConfigCommands::Show => show_config(),
        ConfigCommands::Path => {
            show_config_path();
            Ok(())
        }
    }
}

fn init_config(force: bool, custom_path: Option<PathBuf>) -> Result<(), VeilError> {
    let config_path = custom_path.unwrap_or_else(default_config_path);

    if config_path.exists() && !force {
        return Err(VeilError::ConfigError(format!(
            "Configuration file already exists at: {}\nUse --force to overwrite.",
            config_path.display()
        )));
    }

    create_config_file(&config_path).map_err(|e| {
        VeilError::ConfigError(format!(
            "Failed to create config file {}: {e}",
            config_path.display()
        ))
    })?;

    println!("{} {}", "Created".green(), config_path.display());
    Ok(())
}

fn default_config_path() -> PathBuf {
    config_paths().into_iter().next().unwrap_or_else(|| PathBuf::from("config.jsonc"))
}

fn show_config() -> Result<(), VeilError> {
    let config = get_config();
    match get_config_path() {
        Some(path) => eprintln!("{}", format!("# {}", path.display()).dimmed()),
        None => eprintln!("{}", "# defaults (no configuration file)".dimmed()),
    }
    output::print_highlighted_json(&serde_json::to_value(config)?);
    Ok(())
}

fn show_config_path() {
    println!("Configuration file search paths (in priority order):\n");

    let mut active = None;
    for (i, path) in config_paths().iter().enumerate() {
        let marker = match (path.exists(), active.is_none()) {
            (true, true) => {
                active = Some(i);
                " (active)".green().to_string()
            }
            (true, false) => " (exists)".dimmed().to_string(),
            (false, _) => String::new(),
        };
        println!("  {}. {}{marker}", i + 1, path.display());
    }

    if active.is_none() {
        println!("\nNo configuration file found.");
        println!("Run 'veil config init' to create one.");
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.jsonc");
        std::fs::write(&path, "{}").unwrap();

        let err = init_config(false, Some(path.clone())).unwrap_err();
        assert!(matches!(err, VeilError::ConfigError(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_init_force_writes_template() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.jsonc");

        init_config(false, Some(path.clone())).unwrap();
        assert!(path.exists());

        init_config(true, Some(path.clone())).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), generate_config_template());
    }
}
