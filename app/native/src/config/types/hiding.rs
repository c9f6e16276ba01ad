//! Hiding configuration types.
//!
//! Controls auto-rehide timing and the external display exception.

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default delay before hidden icons collapse again (5 seconds).
const DEFAULT_REHIDE_DELAY_MS: u64 = 5000;

/// Configuration for hiding and auto-rehide behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct HidingConfig {
    /// Whether revealed icons collapse again automatically.
    /// Default: true
    pub auto_rehide: bool,

    /// Delay in milliseconds before an automatic rehide.
    /// Default: 5000
    pub rehide_delay: u64,

    /// Keep icons revealed while the active display is not the built-in one.
    /// Default: false
    pub keep_revealed_on_external_display: bool,

    /// Time in milliseconds the status shell needs to settle after a marker
    /// length change during `hide`/`show`.
    /// Default: 0
    pub animation_settle: u64,
}

impl Default for HidingConfig {
    fn default() -> Self {
        Self {
            auto_rehide: true,
            rehide_delay: DEFAULT_REHIDE_DELAY_MS,
            keep_revealed_on_external_display: false,
            animation_settle: 0,
        }
    }
}

impl HidingConfig {
    /// Returns the rehide delay as a [`Duration`].
    #[must_use]
    pub const fn rehide_delay(&self) -> Duration { Duration::from_millis(self.rehide_delay) }

    /// Returns the settle time after `hide`/`show` as a [`Duration`].
    #[must_use]
    pub const fn animation_settle(&self) -> Duration { Duration::from_millis(self.animation_settle) }
}
