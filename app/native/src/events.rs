//! Centralized event names emitted by the engine.
//!
//! Events are delivered through [`crate::platform::Notifier`] so the
//! presentation layer can refresh whatever it shows.
//!
//! ## Naming Convention
//!
//! All events follow the pattern: `veil://<module>/<event-name>`

/// Menu bar related events.
pub mod menubar {
    /// Emitted when the logical hiding state changes.
    ///
    /// Payload: none; consumers read the state from the controller.
    pub const VISIBILITY_CHANGED: &str = "veil://menubar/visibility-changed";

    /// Emitted after a move finishes (successfully or not) so icon lists
    /// and zone badges can be refreshed.
    pub const ICONS_MOVED: &str = "veil://menubar/icons-moved";

    /// Emitted when the persisted pin set changes.
    pub const PINS_CHANGED: &str = "veil://menubar/pins-changed";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_use_prefix() {
        for name in [menubar::VISIBILITY_CHANGED, menubar::ICONS_MOVED, menubar::PINS_CHANGED] {
            assert!(name.starts_with("veil://menubar/"), "bad event name: {name}");
        }
    }
}
