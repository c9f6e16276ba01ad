//! In-memory status bar.
//!
//! [`SimulatedStatusBar`] implements the shell, accessibility and pointer
//! collaborators over a plain list of icons so the engine can be driven
//! without a window server: by `veil simulate` and by the test suites.
//!
//! Layout model: markers sit at fixed origins while at visual length and
//! report an off-screen frame while blocking. A successful drag drops the icon
//! just left of the clamped target when moving left and just right of it when
//! moving right.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;

use super::{AccessibilityService, Authenticator, Notifier, PointerDevice, WindowShell};
use crate::menubar::{DragPlan, HostedIcon, MarkerFrame, MarkerKind, Point, is_blocking};

/// X reported for a marker pushed off screen.
const OFF_SCREEN_X: f64 = -10_000.0;

#[derive(Default)]
struct Markers {
    lengths: HashMap<MarkerKind, f64>,
    origins: HashMap<MarkerKind, f64>,
    length_changes: Vec<(MarkerKind, f64)>,
}

/// Shell, accessibility and pointer collaborators backed by memory.
pub struct SimulatedStatusBar {
    markers: Mutex<Markers>,
    icons: Mutex<Vec<HostedIcon>>,
    drags: Mutex<Vec<DragPlan>>,
    pointer: Mutex<Option<Point>>,
    warps: Mutex<Vec<Point>>,
    permission: AtomicBool,
    builtin_display: AtomicBool,
    ignored_drags: AtomicUsize,
    invalidations: AtomicUsize,
}

impl Default for SimulatedStatusBar {
    fn default() -> Self { Self::new() }
}

impl SimulatedStatusBar {
    /// A bar with the separator at 600, the always-hidden separator at 300
    /// and the main marker at 900. No icons.
    #[must_use]
    pub fn new() -> Self {
        let bar = Self {
            markers: Mutex::new(Markers::default()),
            icons: Mutex::new(Vec::new()),
            drags: Mutex::new(Vec::new()),
            pointer: Mutex::new(Some(Point::new(1_200.0, 12.0))),
            warps: Mutex::new(Vec::new()),
            permission: AtomicBool::new(true),
            builtin_display: AtomicBool::new(true),
            ignored_drags: AtomicUsize::new(0),
            invalidations: AtomicUsize::new(0),
        };
        bar.place_marker(MarkerKind::Main, 900.0);
        bar.place_marker(MarkerKind::Separator, 600.0);
        bar.place_marker(MarkerKind::AlwaysHiddenSeparator, 300.0);
        bar
    }

    // ------------------------------------------------------------------------
    // Setup
    // ------------------------------------------------------------------------

    /// Sets where a marker appears while at visual length.
    pub fn place_marker(&self, kind: MarkerKind, x: f64) { self.markers.lock().origins.insert(kind, x); }

    /// Adds or replaces an icon.
    pub fn add_icon(&self, icon: HostedIcon) {
        let mut icons = self.icons.lock();
        icons.retain(|existing| !existing.is_same_icon(&icon));
        icons.push(icon);
    }

    /// Removes every icon owned by `owner_id`.
    pub fn remove_owner(&self, owner_id: &str) {
        self.icons.lock().retain(|icon| icon.identity.owner_id != owner_id);
    }

    /// Grants or revokes the accessibility permission.
    pub fn set_permission(&self, granted: bool) { self.permission.store(granted, Ordering::SeqCst); }

    /// Sets whether the active display is built in.
    pub fn set_builtin_display(&self, builtin: bool) {
        self.builtin_display.store(builtin, Ordering::SeqCst);
    }

    /// Removes the pointer, as if no display were attached.
    pub fn disconnect_display(&self) { *self.pointer.lock() = None; }

    /// The next `count` drags report success but leave the icon in place.
    pub fn ignore_drags(&self, count: usize) { self.ignored_drags.store(count, Ordering::SeqCst); }

    // ------------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------------

    /// Current length of a marker, if it exists.
    #[must_use]
    pub fn marker_length(&self, kind: MarkerKind) -> Option<f64> {
        self.markers.lock().lengths.get(&kind).copied()
    }

    /// Every length change applied through the shell, in order.
    #[must_use]
    pub fn length_changes(&self) -> Vec<(MarkerKind, f64)> { self.markers.lock().length_changes.clone() }

    /// Current position of the icon with the same identity.
    #[must_use]
    pub fn icon(&self, identity: &crate::menubar::IconIdentity) -> Option<HostedIcon> {
        self.icons.lock().iter().find(|icon| &icon.identity == identity).cloned()
    }

    /// Every drag plan received, in order.
    #[must_use]
    pub fn drags(&self) -> Vec<DragPlan> { self.drags.lock().clone() }

    /// Pointer positions restored after drags.
    #[must_use]
    pub fn warps(&self) -> Vec<Point> { self.warps.lock().clone() }

    /// How many times the icon cache was invalidated.
    #[must_use]
    pub fn invalidations(&self) -> usize { self.invalidations.load(Ordering::SeqCst) }
}

impl WindowShell for SimulatedStatusBar {
    fn create_marker(&self, kind: MarkerKind, length: f64, _autosave_name: &str) -> bool {
        self.markers.lock().lengths.insert(kind, length);
        true
    }

    fn remove_marker(&self, kind: MarkerKind) { self.markers.lock().lengths.remove(&kind); }

    fn marker_frame(&self, kind: MarkerKind) -> Option<MarkerFrame> {
        let markers = self.markers.lock();
        let length = *markers.lengths.get(&kind)?;
        if is_blocking(length) {
            return Some(MarkerFrame::new(OFF_SCREEN_X, length));
        }
        markers.origins.get(&kind).map(|x| MarkerFrame::new(*x, length))
    }

    fn set_marker_length(&self, kind: MarkerKind, length: f64) {
        let mut markers = self.markers.lock();
        if let Some(current) = markers.lengths.get_mut(&kind) {
            *current = length;
            markers.length_changes.push((kind, length));
        }
    }

    fn active_display_is_builtin(&self) -> bool { self.builtin_display.load(Ordering::SeqCst) }
}

impl AccessibilityService for SimulatedStatusBar {
    fn has_permission(&self) -> bool { self.permission.load(Ordering::SeqCst) }

    fn hosted_icons(&self) -> Vec<HostedIcon> { self.icons.lock().clone() }

    fn simulate_drag(&self, icon: &HostedIcon, plan: &DragPlan) -> bool {
        self.drags.lock().push(*plan);

        let ignored = self.ignored_drags.load(Ordering::SeqCst);
        if ignored > 0 {
            self.ignored_drags.store(ignored - 1, Ordering::SeqCst);
            return true;
        }

        let mut icons = self.icons.lock();
        let Some(current) = icons.iter_mut().find(|candidate| candidate.is_same_icon(icon)) else {
            return false;
        };

        let target = plan.clamped_target();
        current.x = if target < current.x { target - current.width } else { target + 1.0 };
        true
    }

    fn invalidate_icon_cache(&self) { self.invalidations.fetch_add(1, Ordering::SeqCst); }
}

impl PointerDevice for SimulatedStatusBar {
    fn location(&self) -> Option<Point> { *self.pointer.lock() }

    fn warp(&self, point: Point) {
        self.warps.lock().push(point);
        *self.pointer.lock() = Some(point);
    }
}

/// Authenticator that answers every challenge the same way.
pub struct ScriptedAuthenticator {
    answer: AtomicBool,
    prompts: AtomicUsize,
}

impl ScriptedAuthenticator {
    #[must_use]
    pub const fn answering(answer: bool) -> Self {
        Self { answer: AtomicBool::new(answer), prompts: AtomicUsize::new(0) }
    }

    /// Changes the answer for subsequent challenges.
    pub fn set_answer(&self, answer: bool) { self.answer.store(answer, Ordering::SeqCst); }

    /// Number of challenges presented.
    #[must_use]
    pub fn prompts(&self) -> usize { self.prompts.load(Ordering::SeqCst) }
}

impl Authenticator for ScriptedAuthenticator {
    fn challenge(&self, reason: &str) -> BoxFuture<'static, bool> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(reason, "simulated authentication challenge");
        futures::future::ready(self.answer.load(Ordering::SeqCst)).boxed()
    }
}

/// Notifier that records emitted events.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<&'static str>>,
}

impl RecordingNotifier {
    /// Events emitted so far.
    #[must_use]
    pub fn events(&self) -> Vec<&'static str> { self.events.lock().clone() }

    /// How many times `event` was emitted.
    #[must_use]
    pub fn count(&self, event: &str) -> usize { self.events.lock().iter().filter(|e| **e == event).count() }
}

impl Notifier for RecordingNotifier {
    fn emit(&self, event: &'static str) {
        tracing::trace!(event, "notify");
        self.events.lock().push(event);
    }
}
