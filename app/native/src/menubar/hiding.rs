//! Hiding state machine.
//!
//! Owns the logical state (`Expanded` / `Hidden`), the installed markers and
//! their lengths, and the position cache. Every marker length change in the
//! process goes through this type.
//!
//! # Shield
//!
//! Classification and simulated drags need every marker on screen at visual
//! size even while the user-facing state stays `Hidden`. [`HidingStateMachine::show_all`]
//! expands all markers and returns a [`ShieldGuard`]; dropping the guard runs
//! [`HidingStateMachine::restore_from_show_all`], which puts the boundary
//! markers back to the lengths matching the logical state captured when the
//! shield went up. Shields nest: only the outermost pair touches the shell.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;

use super::marker::{BLOCKING_LENGTH, MarkerKind, MarkerSet};
use super::position::PositionCache;
use super::zone::ZoneBoundaries;
use crate::error::VeilError;
use crate::platform::{Clock, WindowShell};

/// Logical visibility of the hidden zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HidingState {
    /// Hidden icons are shown.
    #[default]
    Expanded,
    /// Hidden icons are pushed off screen.
    Hidden,
}

/// Point-in-time view of the state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HidingSnapshot {
    /// Logical state.
    pub state: HidingState,
    /// A `hide`/`show` length change is settling.
    pub is_animating: bool,
    /// A freshly raised shield is settling.
    pub is_transitioning: bool,
    /// The user asked to keep icons revealed.
    pub is_reveal_pinned: bool,
    /// Current shield nesting depth.
    pub shield_depth: usize,
}

#[derive(Debug, Clone, Copy)]
struct ShieldFrame {
    depth: usize,
    captured: HidingState,
}

#[derive(Debug, Default)]
struct Inner {
    state: HidingState,
    is_animating: bool,
    settling_shields: usize,
    is_reveal_pinned: bool,
    markers: MarkerSet,
    shield: Option<ShieldFrame>,
    shields_raised: usize,
    shields_restored: usize,
}

/// The hiding state machine. See the module docs.
pub struct HidingStateMachine {
    shell: Arc<dyn WindowShell>,
    clock: Arc<dyn Clock>,
    cache: PositionCache,
    animation_settle: Duration,
    always_hidden_enabled: AtomicBool,
    inner: Mutex<Inner>,
}

impl HidingStateMachine {
    /// Creates a state machine. Markers are created by [`Self::install`].
    #[must_use]
    pub fn new(shell: Arc<dyn WindowShell>, clock: Arc<dyn Clock>, animation_settle: Duration) -> Self {
        Self {
            shell,
            clock,
            cache: PositionCache::new(),
            animation_settle,
            always_hidden_enabled: AtomicBool::new(false),
            inner: Mutex::new(Inner::default()),
        }
    }

    // ========================================================================
    // Marker lifecycle
    // ========================================================================

    /// Creates the markers at visual length.
    ///
    /// # Errors
    ///
    /// Returns [`VeilError::PositionUnavailable`] if the shell refuses to
    /// create the main marker or the separator.
    pub fn install(&self, always_hidden: bool) -> Result<(), VeilError> {
        let mut inner = self.inner.lock();

        for kind in [MarkerKind::Main, MarkerKind::Separator] {
            if inner.markers.contains(kind) {
                continue;
            }
            if !self.shell.create_marker(kind, kind.visual_length(), kind.autosave_name()) {
                return Err(VeilError::PositionUnavailable(format!("failed to create {kind} marker")));
            }
            inner.markers.insert(kind, kind.visual_length());
        }
        drop(inner);

        self.set_always_hidden_enabled(always_hidden);
        tracing::debug!(always_hidden, "markers installed");
        Ok(())
    }

    /// Creates or removes the always-hidden separator.
    pub fn set_always_hidden_enabled(&self, enabled: bool) {
        let kind = MarkerKind::AlwaysHiddenSeparator;
        let mut inner = self.inner.lock();

        if enabled && !inner.markers.contains(kind) {
            let length = self.length_for(kind, effective_state(&inner));
            if self.shell.create_marker(kind, length, kind.autosave_name()) {
                inner.markers.insert(kind, length);
            } else {
                tracing::warn!("failed to create always-hidden separator");
                return;
            }
        } else if !enabled && inner.markers.contains(kind) {
            self.shell.remove_marker(kind);
            inner.markers.remove(kind);
            self.cache.forget(kind);
        }

        self.always_hidden_enabled.store(inner.markers.contains(kind), Ordering::SeqCst);
    }

    /// Whether the always-hidden zone is enabled and its marker exists.
    #[must_use]
    pub fn always_hidden_enabled(&self) -> bool { self.always_hidden_enabled.load(Ordering::SeqCst) }

    /// Whether the marker is installed.
    #[must_use]
    pub fn has_marker(&self, kind: MarkerKind) -> bool { self.inner.lock().markers.contains(kind) }

    /// Current length of an installed marker.
    #[must_use]
    pub fn marker_length(&self, kind: MarkerKind) -> Option<f64> {
        self.inner.lock().markers.length(kind)
    }

    // ========================================================================
    // Positions
    // ========================================================================

    /// Left edge of a marker, live when possible and cached otherwise.
    #[must_use]
    pub fn marker_x(&self, kind: MarkerKind) -> Option<f64> {
        let length = self.marker_length(kind)?;
        self.cache.origin_x(self.shell.as_ref(), kind, length)
    }

    /// Right edge of a marker, assuming visual length when it is blocking.
    #[must_use]
    pub fn marker_right_edge(&self, kind: MarkerKind) -> Option<f64> {
        let length = self.marker_length(kind)?;
        let width = if super::marker::is_blocking(length) { kind.visual_length() } else { length };
        self.marker_x(kind).map(|x| x + width)
    }

    /// Boundaries for zone classification, if the separator position is known.
    #[must_use]
    pub fn boundaries(&self) -> Option<ZoneBoundaries> {
        let separator_x = self.marker_x(MarkerKind::Separator)?;
        let always_hidden_x = if self.always_hidden_enabled() {
            self.marker_x(MarkerKind::AlwaysHiddenSeparator)
        } else {
            None
        };
        Some(ZoneBoundaries { separator_x, always_hidden_x })
    }

    // ========================================================================
    // State
    // ========================================================================

    /// Current logical state.
    #[must_use]
    pub fn state(&self) -> HidingState { self.inner.lock().state }

    /// Point-in-time snapshot of all flags.
    #[must_use]
    pub fn snapshot(&self) -> HidingSnapshot {
        let inner = self.inner.lock();
        HidingSnapshot {
            state: inner.state,
            is_animating: inner.is_animating,
            is_transitioning: inner.settling_shields > 0,
            is_reveal_pinned: inner.is_reveal_pinned,
            shield_depth: inner.shield.map_or(0, |frame| frame.depth),
        }
    }

    /// `true` while a length change is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        let inner = self.inner.lock();
        inner.is_animating || inner.settling_shields > 0
    }

    /// Whether a shield is currently up.
    #[must_use]
    pub fn is_shielded(&self) -> bool { self.inner.lock().shield.is_some() }

    /// Whether the user pinned the reveal open.
    #[must_use]
    pub fn is_reveal_pinned(&self) -> bool { self.inner.lock().is_reveal_pinned }

    /// Sets or clears the pinned reveal.
    pub fn set_reveal_pinned(&self, pinned: bool) { self.inner.lock().is_reveal_pinned = pinned; }

    /// Outermost shields raised and restored so far.
    #[must_use]
    pub fn shield_counts(&self) -> (usize, usize) {
        let inner = self.inner.lock();
        (inner.shields_raised, inner.shields_restored)
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Collapses the hidden zone by expanding the boundaries to blocking length.
    ///
    /// # Errors
    ///
    /// Returns [`VeilError::Busy`] while another `hide`/`show` is settling.
    pub async fn hide(&self) -> Result<(), VeilError> { self.transition(HidingState::Hidden).await }

    /// Reveals the hidden zone by restoring visual lengths.
    ///
    /// # Errors
    ///
    /// Returns [`VeilError::Busy`] while another `hide`/`show` is settling.
    pub async fn show(&self) -> Result<(), VeilError> { self.transition(HidingState::Expanded).await }

    /// Flips the logical state and returns the new one.
    ///
    /// # Errors
    ///
    /// Returns [`VeilError::Busy`] while another `hide`/`show` is settling.
    pub async fn toggle(&self) -> Result<HidingState, VeilError> {
        let next = match self.state() {
            HidingState::Expanded => HidingState::Hidden,
            HidingState::Hidden => HidingState::Expanded,
        };
        self.transition(next).await?;
        Ok(next)
    }

    async fn transition(&self, target: HidingState) -> Result<(), VeilError> {
        {
            let mut inner = self.inner.lock();
            if inner.is_animating {
                return Err(VeilError::Busy("marker animation in progress".to_string()));
            }

            inner.state = target;
            if inner.shield.is_some() {
                tracing::debug!(state = ?target, "shield active, length change deferred to restore");
                return Ok(());
            }

            if target == HidingState::Hidden {
                self.refresh_cache(&inner);
            }
            inner.is_animating = true;
            self.apply_lengths(&mut inner, target);
        }

        let _animating = AnimatingGuard { machine: self };
        self.clock.sleep(self.animation_settle).await;
        tracing::debug!(state = ?target, "hiding state changed");
        Ok(())
    }

    /// Forces every marker to visual length regardless of the logical state.
    ///
    /// Drop the returned guard (or call [`ShieldGuard::restore`]) to undo it.
    pub fn show_all(self: &Arc<Self>) -> ShieldGuard {
        let mut inner = self.inner.lock();

        if let Some(frame) = inner.shield.as_mut() {
            frame.depth += 1;
            tracing::trace!(depth = frame.depth, "shield nested");
        } else {
            inner.shield = Some(ShieldFrame { depth: 1, captured: inner.state });
            inner.shields_raised += 1;
            let kinds: Vec<_> = inner.markers.installed().collect();
            for kind in kinds {
                self.set_length(&mut inner, kind, kind.visual_length());
            }
            tracing::debug!(captured = ?inner.state, "shield raised");
        }

        ShieldGuard { machine: Arc::clone(self), released: false }
    }

    /// Waits `settle` for markers just expanded by [`Self::show_all`].
    ///
    /// The machine reports busy until the settle elapses, so moves and pin
    /// enforcement started meanwhile are refused.
    pub async fn settle_shield(&self, settle: Duration) {
        self.inner.lock().settling_shields += 1;
        let _settling = SettlingGuard { machine: self };
        self.clock.sleep(settle).await;
    }

    /// Undoes one [`Self::show_all`].
    ///
    /// The outermost restore applies the lengths for the logical state
    /// captured by `show_all`, then the current logical state if a `hide` or
    /// `show` happened in between.
    pub fn restore_from_show_all(&self) {
        let mut inner = self.inner.lock();

        let Some(frame) = inner.shield.as_mut() else {
            tracing::warn!("restore requested without an active shield");
            return;
        };

        frame.depth -= 1;
        if frame.depth > 0 {
            return;
        }

        let captured = frame.captured;
        inner.shield = None;
        inner.shields_restored += 1;

        self.refresh_cache(&inner);
        self.apply_lengths(&mut inner, captured);
        let current = inner.state;
        if current != captured {
            self.apply_lengths(&mut inner, current);
        }
        tracing::debug!(state = ?current, "shield restored");
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn length_for(&self, kind: MarkerKind, state: HidingState) -> f64 {
        match state {
            HidingState::Hidden if kind.is_boundary() => BLOCKING_LENGTH,
            _ => kind.visual_length(),
        }
    }

    fn apply_lengths(&self, inner: &mut Inner, state: HidingState) {
        let kinds: Vec<_> = inner.markers.installed().filter(|kind| kind.is_boundary()).collect();
        for kind in kinds {
            self.set_length(inner, kind, self.length_for(kind, state));
        }
    }

    fn set_length(&self, inner: &mut Inner, kind: MarkerKind, length: f64) {
        if inner.markers.length(kind) == Some(length) {
            return;
        }
        self.shell.set_marker_length(kind, length);
        inner.markers.set_length(kind, length);
    }

    /// Reads every visual-size marker once so the cache holds fresh values.
    fn refresh_cache(&self, inner: &Inner) {
        for kind in inner.markers.installed() {
            if let Some(length) = inner.markers.length(kind) {
                let _ = self.cache.origin_x(self.shell.as_ref(), kind, length);
            }
        }
    }
}

fn effective_state(inner: &Inner) -> HidingState {
    if inner.shield.is_some() { HidingState::Expanded } else { inner.state }
}

/// Clears `is_animating` even if the transition future is dropped mid-settle.
struct AnimatingGuard<'a> {
    machine: &'a HidingStateMachine,
}

impl Drop for AnimatingGuard<'_> {
    fn drop(&mut self) { self.machine.inner.lock().is_animating = false; }
}

/// Ends a shield settle even if the waiting future is dropped.
struct SettlingGuard<'a> {
    machine: &'a HidingStateMachine,
}

impl Drop for SettlingGuard<'_> {
    fn drop(&mut self) { self.machine.inner.lock().settling_shields -= 1; }
}

/// Keeps the shield up until dropped.
#[must_use = "dropping the guard restores the markers immediately"]
pub struct ShieldGuard {
    machine: Arc<HidingStateMachine>,
    released: bool,
}

impl ShieldGuard {
    /// Restores explicitly. Equivalent to dropping the guard.
    pub fn restore(mut self) {
        self.released = true;
        self.machine.restore_from_show_all();
    }
}

impl Drop for ShieldGuard {
    fn drop(&mut self) {
        if !self.released {
            self.machine.restore_from_show_all();
        }
    }
}
