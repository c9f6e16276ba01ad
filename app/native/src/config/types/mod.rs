//! Configuration types for Veil.
//!
//! This module provides all configuration types organized by domain.
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

pub mod always_hidden;
pub mod hiding;
pub mod privacy;
pub mod root;

// Always-hidden zone types
pub use always_hidden::AlwaysHiddenConfig;
// Hiding types
pub use hiding::HidingConfig;
// Privacy types
pub use privacy::PrivacyConfig;
// Root config types
pub use root::{ConfigError, VeilConfig, config_paths, load_config, load_config_from_path};
