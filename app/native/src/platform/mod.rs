//! Platform collaborator abstractions for Veil.
//!
//! The positioning engine never talks to the operating system directly. Every
//! platform facility it needs is expressed as a trait here and injected into
//! [`crate::menubar::MenuBarController`]:
//!
//! - [`WindowShell`] - creates and resizes the boundary markers
//! - [`AccessibilityService`] - enumerates third-party icons and simulates drags
//! - [`PointerDevice`] - captures and restores the real pointer
//! - [`Authenticator`] - presents the biometric/password prompt
//! - [`Notifier`] - delivers refresh events to the presentation layer
//! - [`Clock`] - time source and timed waits (see [`clock`])
//!
//! [`sim`] provides in-memory implementations of all of them.

pub mod clock;
pub mod sim;

use futures::future::BoxFuture;

pub use clock::{Clock, ManualClock, TokioClock};

use crate::menubar::{DragPlan, HostedIcon, MarkerFrame, MarkerKind, Point};

/// The platform status shell hosting the boundary markers.
pub trait WindowShell: Send + Sync {
    /// Creates a marker with the given length and stable autosave name.
    ///
    /// Returns `false` if the shell refused to create it.
    fn create_marker(&self, kind: MarkerKind, length: f64, autosave_name: &str) -> bool;

    /// Removes a marker. Removing a marker that does not exist is a no-op.
    fn remove_marker(&self, kind: MarkerKind);

    /// Reads the marker's host window frame, if it is currently on screen.
    fn marker_frame(&self, kind: MarkerKind) -> Option<MarkerFrame>;

    /// Sets the marker's length.
    fn set_marker_length(&self, kind: MarkerKind, length: f64);

    /// Returns whether the display hosting the active status bar is built in.
    fn active_display_is_builtin(&self) -> bool;
}

/// Accessibility queries over other processes' status items.
pub trait AccessibilityService: Send + Sync {
    /// Whether the process holds the accessibility permission.
    fn has_permission(&self) -> bool;

    /// Enumerates the currently hosted third-party icons.
    fn hosted_icons(&self) -> Vec<HostedIcon>;

    /// Simulates a modifier-drag of `icon` according to `plan`.
    ///
    /// Returns `true` if the collaborator's own post-drag read succeeded.
    fn simulate_drag(&self, icon: &HostedIcon, plan: &DragPlan) -> bool;

    /// Drops any icon positions the collaborator cached.
    fn invalidate_icon_cache(&self);
}

/// The real pointing device.
pub trait PointerDevice: Send + Sync {
    /// Current pointer location, or `None` if no display is available.
    fn location(&self) -> Option<Point>;

    /// Moves the pointer back to `point`.
    fn warp(&self, point: Point);
}

/// Biometric or password prompt.
pub trait Authenticator: Send + Sync {
    /// Presents a challenge and resolves to `true` if the user passed it.
    fn challenge(&self, reason: &str) -> BoxFuture<'static, bool>;
}

/// Delivers refresh events (see [`crate::events`]).
pub trait Notifier: Send + Sync {
    /// Emits the named event.
    fn emit(&self, event: &'static str);
}
