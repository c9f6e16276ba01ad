//! Pin enforcement.
//!
//! Reconciles the persisted pins with the icons currently hosted: every
//! resolvable pinned icon that is not in the always-hidden zone is moved
//! there. Safe to call repeatedly; only one batch runs at a time and moves are
//! serialized through [`MoveOrchestrator::move_and_wait`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

use super::hiding::{HidingState, HidingStateMachine};
use super::marker::MarkerKind;
use super::mover::{EXPANDED_SETTLE, MoveOrchestrator, SHIELD_SETTLE};
use super::pin_store::PinStore;
use super::pins::PinnedIdentifier;
use super::zone::Zone;
use crate::events;
use crate::platform::{AccessibilityService, Notifier};

/// Why a batch did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EnforcementSkip {
    AlreadyRunning,
    AlwaysHiddenDisabled,
    NoPins,
    PinStoreUnavailable,
    PermissionDenied,
    Busy,
    /// Marker positions unknown or the always-hidden separator is not left
    /// of the separator.
    UnverifiableOrdering,
}

/// Outcome of one enforcement batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnforcementReport {
    pub reason: String,
    pub skipped: Option<EnforcementSkip>,
    /// Pins that resolved to a hosted icon.
    pub resolved: usize,
    pub moved: usize,
    pub already_in_zone: usize,
    pub failed: usize,
    /// Pins with no matching icon right now.
    pub unresolved: Vec<String>,
    /// Unparseable pins removed from the store.
    pub dropped: Vec<String>,
}

impl EnforcementReport {
    fn new(reason: &str) -> Self { Self { reason: reason.to_string(), ..Self::default() } }

    fn skip(mut self, why: EnforcementSkip) -> Self {
        tracing::debug!(reason = %self.reason, skipped = ?why, "pin enforcement skipped");
        self.skipped = Some(why);
        self
    }
}

/// Runs pin enforcement batches.
pub struct PinEnforcer {
    hiding: Arc<HidingStateMachine>,
    mover: Arc<MoveOrchestrator>,
    accessibility: Arc<dyn AccessibilityService>,
    pin_store: Arc<dyn PinStore>,
    notifier: Arc<dyn Notifier>,
    running: AtomicBool,
}

impl PinEnforcer {
    #[must_use]
    pub fn new(
        hiding: Arc<HidingStateMachine>,
        mover: Arc<MoveOrchestrator>,
        accessibility: Arc<dyn AccessibilityService>,
        pin_store: Arc<dyn PinStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            hiding,
            mover,
            accessibility,
            pin_store,
            notifier,
            running: AtomicBool::new(false),
        }
    }

    /// Runs one batch. `owner` restricts it to icons of that owner.
    pub async fn enforce(&self, reason: &str, owner: Option<&str>) -> EnforcementReport {
        let report = EnforcementReport::new(reason);

        if self.running.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
            return report.skip(EnforcementSkip::AlreadyRunning);
        }
        let _running = RunningGuard(&self.running);

        if !self.hiding.always_hidden_enabled() || !self.hiding.has_marker(MarkerKind::AlwaysHiddenSeparator) {
            return report.skip(EnforcementSkip::AlwaysHiddenDisabled);
        }

        let stored = match self.pin_store.load() {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load pins");
                return report.skip(EnforcementSkip::PinStoreUnavailable);
            }
        };
        if stored.is_empty() {
            return report.skip(EnforcementSkip::NoPins);
        }

        if !self.accessibility.has_permission() {
            return report.skip(EnforcementSkip::PermissionDenied);
        }
        if self.hiding.is_busy() {
            return report.skip(EnforcementSkip::Busy);
        }

        let (pins, report) = self.parse_pins(stored, report);
        self.run_batch(pins, owner, report).await
    }

    /// Parses stored pins, dropping and persisting the removal of bad ones.
    fn parse_pins(&self, stored: Vec<String>, mut report: EnforcementReport) -> (Vec<PinnedIdentifier>, EnforcementReport) {
        let mut pins = Vec::with_capacity(stored.len());
        let mut kept = Vec::with_capacity(stored.len());

        for raw in stored {
            match raw.parse::<PinnedIdentifier>() {
                Ok(pin) => {
                    pins.push(pin);
                    kept.push(raw);
                }
                Err(err) => {
                    tracing::warn!(pin = %raw, error = %err, "dropping unparseable pin");
                    report.dropped.push(raw);
                }
            }
        }

        if !report.dropped.is_empty() {
            match self.pin_store.save(&kept) {
                Ok(()) => self.notifier.emit(events::menubar::PINS_CHANGED),
                Err(err) => tracing::warn!(error = %err, "failed to persist pin cleanup"),
            }
        }

        (pins, report)
    }

    async fn run_batch(
        &self,
        pins: Vec<PinnedIdentifier>,
        owner: Option<&str>,
        mut report: EnforcementReport,
    ) -> EnforcementReport {
        let started_hidden = self.hiding.state() == HidingState::Hidden;
        let shield = self.hiding.show_all();
        self.hiding
            .settle_shield(if started_hidden { SHIELD_SETTLE } else { EXPANDED_SETTLE })
            .await;

        if !self.markers_ordered() {
            tracing::warn!(reason = %report.reason, "marker ordering unverifiable, aborting pin enforcement");
            shield.restore();
            return report.skip(EnforcementSkip::UnverifiableOrdering);
        }

        for pin in pins {
            let icons = self.accessibility.hosted_icons();
            let Some(icon) = pin.resolve(&icons).cloned() else {
                if owner.is_none_or(|owner| pin.owner() == Some(owner)) {
                    tracing::trace!(%pin, "pinned icon not hosted");
                    report.unresolved.push(pin.to_string());
                }
                continue;
            };

            if owner.is_some_and(|owner| icon.identity.owner_id != owner) {
                continue;
            }
            report.resolved += 1;

            let zone = self.hiding.boundaries().map(|bounds| bounds.classify(&icon));
            if zone == Some(Zone::AlwaysHidden) {
                report.already_in_zone += 1;
                continue;
            }

            if self.mover.move_and_wait(icon, Zone::AlwaysHidden).await {
                report.moved += 1;
            } else {
                report.failed += 1;
            }
        }

        // Restores the hidden layout when the batch started hidden.
        shield.restore();

        tracing::info!(
            reason = %report.reason,
            resolved = report.resolved,
            moved = report.moved,
            failed = report.failed,
            unresolved = report.unresolved.len(),
            "pin enforcement finished"
        );
        report
    }

    fn markers_ordered(&self) -> bool {
        let separator_x = self.hiding.marker_x(MarkerKind::Separator);
        let always_hidden_x = self.hiding.marker_x(MarkerKind::AlwaysHiddenSeparator);
        matches!((always_hidden_x, separator_x), (Some(ah), Some(sep)) if ah < sep)
    }
}

struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) { self.0.store(false, Ordering::SeqCst); }
}
