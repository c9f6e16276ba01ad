//! Privacy configuration types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Configuration for privacy mode.
///
/// When enabled, every transition that would expose hidden icons must pass
/// a biometric or password challenge first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PrivacyConfig {
    /// Require authentication before revealing hidden icons.
    /// Default: false
    pub require_authentication: bool,
}

impl PrivacyConfig {
    /// Returns whether reveals are gated behind authentication.
    #[must_use]
    pub const fn is_enabled(&self) -> bool { self.require_authentication }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privacy_disabled_by_default() {
        assert!(!PrivacyConfig::default().is_enabled());
    }

    #[test]
    fn test_deserialize_from_json() {
        let config: PrivacyConfig =
            serde_json::from_str(r#"{"requireAuthentication": true}"#).unwrap();
        assert!(config.is_enabled());
    }
}
