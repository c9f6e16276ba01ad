//! Always-hidden zone configuration types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Configuration for the always-hidden zone.
///
/// The zone sits left of the regular hidden zone and is bounded by a second
/// separator. Pinned icons are kept there across relaunches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct AlwaysHiddenConfig {
    /// Whether the always-hidden separator is installed.
    /// Default: true
    pub enabled: bool,
}

impl Default for AlwaysHiddenConfig {
    fn default() -> Self { Self { enabled: true } }
}

impl AlwaysHiddenConfig {
    /// Returns whether the always-hidden zone is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool { self.enabled }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_hidden_enabled_by_default() {
        assert!(AlwaysHiddenConfig::default().is_enabled());
    }

    #[test]
    fn test_deserialize_disabled() {
        let config: AlwaysHiddenConfig = serde_json::from_str(r#"{"enabled": false}"#).unwrap();
        assert!(!config.is_enabled());
    }
}
