//! Application-wide constants.

/// Application identifier used for config, data and log namespacing.
pub const APP_BUNDLE_ID: &str = "com.veil.app";

/// Directory name used under the user's config and data directories.
pub const APP_DIR_NAME: &str = "veil";

/// Environment variable holding the log filter directive.
pub const LOG_ENV_VAR: &str = "VEIL_LOG";
