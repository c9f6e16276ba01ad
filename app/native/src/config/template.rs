//! Configuration template generation.
//!
//! Generates a commented configuration template with all available options.

use std::fs;
use std::path::Path;

/// Generates a configuration template with all options commented out.
#[must_use]
pub fn generate_config_template() -> String {
    r#"// Veil Configuration File
// ========================
// This file uses JSONC format (JSON with comments).
// All options below are commented out and show their default values.
// Uncomment and modify the options you want to configure.

{
  // ============================================================================
  // Hiding
  // ============================================================================
  // "hiding": {
  //   // Collapse revealed icons again after a delay
  //   "autoRehide": true,
  //
  //   // Delay in milliseconds before an automatic rehide
  //   "rehideDelay": 5000,
  //
  //   // Keep icons revealed while an external display is active
  //   "keepRevealedOnExternalDisplay": false,
  //
  //   // Milliseconds to wait for the status bar to settle after hide/show
  //   "animationSettle": 0
  // },

  // ============================================================================
  // Privacy
  // ============================================================================
  // "privacy": {
  //   // Ask for Touch ID or password before revealing hidden icons
  //   "requireAuthentication": false
  // },

  // ============================================================================
  // Always-Hidden Zone
  // ============================================================================
  // "alwaysHidden": {
  //   // Install the second separator that bounds the always-hidden zone
  //   "enabled": true
  // }
}
"#
    .to_string()
}

/// Creates a configuration file with the template at the specified path.
///
/// Creates parent directories if they don't exist.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn create_config_file(path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, generate_config_template())
}
