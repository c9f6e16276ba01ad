//! Root configuration type and loading.
//!
//! The configuration file supports JSONC format (JSON with comments).

use std::fs;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{AlwaysHiddenConfig, HidingConfig, PrivacyConfig};
use crate::constants::APP_DIR_NAME;

/// Supported configuration file names, in priority order.
const CONFIG_FILE_NAMES: [&str; 2] = ["config.jsonc", "config.json"];

/// Legacy single-file configuration names in the home directory.
const LEGACY_CONFIG_FILE_NAMES: [&str; 2] = [".veil.jsonc", ".veil.json"];

/// Root configuration for Veil.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct VeilConfig {
    /// Hiding and auto-rehide behavior.
    pub hiding: HidingConfig,

    /// Privacy mode (authentication before reveal).
    pub privacy: PrivacyConfig,

    /// Always-hidden zone.
    pub always_hidden: AlwaysHiddenConfig,
}

/// Errors that can occur when loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No configuration file was found in any search path.
    #[error("No configuration file found")]
    NotFound,
    /// The configuration file could not be read.
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),
    /// The configuration file contains invalid JSON.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Returns the possible configuration file paths in priority order.
///
/// The function checks the following locations (both `.jsonc` and `.json` variants):
/// 1. `$XDG_CONFIG_HOME/veil/` when the variable is set
/// 2. `~/.config/veil/`
/// 3. `~/Library/Application Support/veil/` (macOS native)
/// 4. `~/.veil.jsonc` or `~/.veil.json`
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    let mut push_dir = |dir: PathBuf, paths: &mut Vec<PathBuf>| {
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    };

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        push_dir(PathBuf::from(xdg_config).join(APP_DIR_NAME), &mut paths);
    }

    if let Some(home) = dirs::home_dir() {
        push_dir(home.join(".config").join(APP_DIR_NAME), &mut paths);
    }

    if let Some(config_dir) = dirs::config_dir() {
        push_dir(config_dir.join(APP_DIR_NAME), &mut paths);
    }

    if let Some(home) = dirs::home_dir() {
        for filename in LEGACY_CONFIG_FILE_NAMES {
            paths.push(home.join(filename));
        }
    }

    paths
}

/// Loads the configuration from a specific file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist,
/// `ConfigError::IoError` if it cannot be read and
/// `ConfigError::ParseError` if it is not valid JSONC.
pub fn load_config_from_path(path: &PathBuf) -> Result<(VeilConfig, PathBuf), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }

    let config = parse_file(path)?;
    Ok((config, path.clone()))
}

/// Loads the configuration from the first available config file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists in any of the expected locations.
/// Returns `ConfigError::IoError` if a configuration file exists but could not be read.
/// Returns `ConfigError::ParseError` if the configuration file contains invalid JSON.
pub fn load_config() -> Result<(VeilConfig, PathBuf), ConfigError> {
    for path in config_paths() {
        if path.exists() {
            let config = parse_file(&path)?;
            return Ok((config, path));
        }
    }

    Err(ConfigError::NotFound)
}

fn parse_file(path: &Path) -> Result<VeilConfig, ConfigError> {
    let file = fs::File::open(path)?;
    // Strip comments from JSONC before parsing
    let reader = json_comments::StripComments::new(file);
    Ok(serde_json::from_reader(reader)?)
}
