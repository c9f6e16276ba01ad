//! Single-flight icon move orchestrator.
//!
//! A move relocates another process's status item by simulating a
//! modifier-drag on the real pointer. Two drags in flight at once corrupt the
//! pointer's button state, so at most one move exists process-wide: a second
//! request while one is outstanding is rejected, never queued. A drag that has
//! started is never cancelled; callers may stop waiting on its handle.
//!
//! # Flow
//!
//! 1. capture the pointer (fails without a display)
//! 2. check the accessibility permission
//! 3. authenticate when revealing a hidden icon under privacy mode
//! 4. raise the shield when hidden, then settle
//! 5. drag, verify, retry once on a verification failure
//! 6. drop the shield, restore the pointer, notify

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

use super::auth::AuthGate;
use super::hiding::{HidingState, HidingStateMachine};
use super::icon::{DragPlan, HostedIcon, IconIdentity};
use super::marker::MarkerKind;
use super::zone::Zone;
use crate::error::VeilError;
use crate::events;
use crate::platform::{AccessibilityService, Clock, Notifier, PointerDevice};

/// Settle after raising the shield over a hidden bar.
pub const SHIELD_SETTLE: Duration = Duration::from_millis(300);

/// Settle when the markers were already at visual size.
pub const EXPANDED_SETTLE: Duration = Duration::from_millis(50);

/// Settle after each simulated drag before verifying.
pub const DRAG_SETTLE: Duration = Duration::from_millis(100);

/// Wait before the second attempt.
pub const RETRY_DELAY: Duration = Duration::from_millis(200);

/// Total drag attempts per move.
pub const MAX_DRAG_ATTEMPTS: u32 = 2;

const REVEAL_REASON: &str = "Reveal hidden menu bar icons";

/// Progress of one move through its drag attempts.
#[derive(Debug)]
enum DragPhase {
    Attempt(u32),
    Verify { attempt: u32, reported_ok: bool },
    Succeeded,
    Failed(VeilError),
}

/// The outstanding move, if any.
struct ActiveMoveTask {
    id: Uuid,
    owner_id: String,
    target: Zone,
    outcome: Shared<BoxFuture<'static, bool>>,
}

/// Public view of the outstanding move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveMoveInfo {
    pub id: Uuid,
    pub owner_id: String,
    pub target: Zone,
}

/// Awaitable result of a started move.
#[must_use = "a move handle does nothing unless awaited"]
pub struct MoveHandle {
    id: Uuid,
    outcome: Shared<BoxFuture<'static, bool>>,
}

impl MoveHandle {
    /// Identifier of the move.
    pub const fn id(&self) -> Uuid { self.id }

    /// Waits for the move and returns whether it succeeded.
    pub async fn wait(self) -> bool { self.outcome.await }
}

/// Orchestrates simulated drags between zones.
pub struct MoveOrchestrator {
    hiding: Arc<HidingStateMachine>,
    accessibility: Arc<dyn AccessibilityService>,
    pointer: Arc<dyn PointerDevice>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    auth: Arc<AuthGate>,
    require_authentication: AtomicBool,
    active: Mutex<Option<ActiveMoveTask>>,
}

impl MoveOrchestrator {
    #[must_use]
    pub fn new(
        hiding: Arc<HidingStateMachine>,
        accessibility: Arc<dyn AccessibilityService>,
        pointer: Arc<dyn PointerDevice>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        auth: Arc<AuthGate>,
    ) -> Self {
        Self {
            hiding,
            accessibility,
            pointer,
            notifier,
            clock,
            auth,
            require_authentication: AtomicBool::new(false),
            active: Mutex::new(None),
        }
    }

    /// Enables or disables the reveal challenge for moves into the visible zone.
    pub fn set_require_authentication(&self, enabled: bool) {
        self.require_authentication.store(enabled, Ordering::SeqCst);
    }

    /// The outstanding move, if any.
    #[must_use]
    pub fn active_move(&self) -> Option<ActiveMoveInfo> {
        self.active.lock().as_ref().map(|task| ActiveMoveInfo {
            id: task.id,
            owner_id: task.owner_id.clone(),
            target: task.target,
        })
    }

    /// Whether a move is outstanding.
    #[must_use]
    pub fn is_moving(&self) -> bool { self.active.lock().is_some() }

    /// Starts a move on a worker task.
    ///
    /// Registration is synchronous: once this returns `Ok`, any other call is
    /// rejected until the returned move finishes.
    ///
    /// # Errors
    ///
    /// Returns [`VeilError::Busy`] while markers are changing length or
    /// another move is outstanding.
    pub fn start_move(self: &Arc<Self>, icon: HostedIcon, target: Zone) -> Result<MoveHandle, VeilError> {
        if self.hiding.is_busy() {
            return Err(VeilError::Busy("marker transition in progress".to_string()));
        }

        let mut active = self.active.lock();
        if let Some(task) = active.as_ref() {
            return Err(VeilError::Busy(format!(
                "move {} of {} is still outstanding",
                task.id, task.owner_id
            )));
        }

        let id = Uuid::now_v7();
        let owner_id = icon.identity.owner_id.clone();
        let this = Arc::clone(self);
        let worker = tokio::spawn(async move {
            let _clear = ActiveClear { orchestrator: Arc::clone(&this), id };
            this.run(id, &icon, target).await
        });

        let outcome = worker.map(|joined| joined.unwrap_or(false)).boxed().shared();
        *active = Some(ActiveMoveTask { id, owner_id, target, outcome: outcome.clone() });
        drop(active);

        tracing::debug!(%id, %target, "move started");
        Ok(MoveHandle { id, outcome })
    }

    /// Moves `icon` into `target` and returns whether it landed there.
    ///
    /// Rejections (including single-flight) return `false`.
    pub async fn move_icon(self: &Arc<Self>, icon: HostedIcon, target: Zone) -> bool {
        match self.start_move(icon, target) {
            Ok(handle) => handle.wait().await,
            Err(err) => {
                tracing::debug!(error = %err, "move rejected");
                false
            }
        }
    }

    /// Waits for any outstanding move, then performs this one.
    pub async fn move_and_wait(self: &Arc<Self>, icon: HostedIcon, target: Zone) -> bool {
        let outstanding = self.active.lock().as_ref().map(|task| task.outcome.clone());
        if let Some(outstanding) = outstanding {
            let _ = outstanding.await;
        }
        self.move_icon(icon, target).await
    }

    // ========================================================================
    // Worker
    // ========================================================================

    async fn run(&self, id: Uuid, icon: &HostedIcon, target: Zone) -> bool {
        match self.execute(icon, target).await {
            Ok(()) => {
                tracing::info!(%id, owner = %icon.identity.owner_id, %target, "icon moved");
                true
            }
            Err(err) => {
                tracing::warn!(%id, owner = %icon.identity.owner_id, %target, error = %err, "icon move failed");
                false
            }
        }
    }

    async fn execute(&self, icon: &HostedIcon, target: Zone) -> Result<(), VeilError> {
        let origin = self
            .pointer
            .location()
            .ok_or_else(|| VeilError::PositionUnavailable("no display available".to_string()))?;

        if !self.accessibility.has_permission() {
            return Err(VeilError::PermissionDenied("accessibility permission not granted".to_string()));
        }

        if target == Zone::Visible
            && self.require_authentication.load(Ordering::SeqCst)
            && self.source_zone(icon) != Some(Zone::Visible)
        {
            self.auth.authenticate(REVEAL_REASON).await?;
        }

        let was_hidden = self.hiding.state() == HidingState::Hidden;
        let shield = if was_hidden {
            let settle = if self.hiding.is_shielded() { EXPANDED_SETTLE } else { SHIELD_SETTLE };
            let guard = self.hiding.show_all();
            self.hiding.settle_shield(settle).await;
            Some(guard)
        } else {
            self.clock.sleep(EXPANDED_SETTLE).await;
            None
        };

        // Marker ordering is checked even when no drag turns out to be needed.
        let result = match self.plan(self.source_zone(icon), target) {
            Err(err) => Err(err),
            Ok(_) if self.current_zone(&icon.identity) == Some(target) => {
                tracing::debug!(%target, "icon already in target zone");
                Ok(())
            }
            Ok(_) => self.drag_with_retry(icon, target).await,
        };

        // Restoring the shield re-applies the hidden layout when the move started hidden.
        drop(shield);
        self.pointer.warp(origin);
        self.accessibility.invalidate_icon_cache();
        self.notifier.emit(events::menubar::ICONS_MOVED);

        result
    }

    async fn drag_with_retry(&self, icon: &HostedIcon, target: Zone) -> Result<(), VeilError> {
        let mut phase = DragPhase::Attempt(1);

        loop {
            phase = match phase {
                DragPhase::Attempt(attempt) => {
                    let plan = self.plan(self.source_zone(icon), target)?;
                    let current = self.locate(&icon.identity).unwrap_or_else(|| icon.clone());
                    tracing::debug!(attempt, target_x = plan.clamped_target(), "simulating drag");

                    let reported_ok = self.accessibility.simulate_drag(&current, &plan);
                    self.clock.sleep(DRAG_SETTLE).await;
                    DragPhase::Verify { attempt, reported_ok }
                }
                DragPhase::Verify { attempt, reported_ok } => {
                    let verified = if reported_ok {
                        self.verify(&icon.identity, target)
                    } else {
                        Err(VeilError::VerificationFailed("drag reported failure".to_string()))
                    };

                    match verified {
                        Ok(()) => DragPhase::Succeeded,
                        Err(err) if attempt < MAX_DRAG_ATTEMPTS => {
                            tracing::debug!(attempt, error = %err, "drag not verified, retrying");
                            self.clock.sleep(RETRY_DELAY).await;
                            DragPhase::Attempt(attempt + 1)
                        }
                        Err(err) => DragPhase::Failed(err),
                    }
                }
                DragPhase::Succeeded => return Ok(()),
                DragPhase::Failed(err) => return Err(err),
            };
        }
    }

    /// Computes the drop target for moving from `source` into `target`.
    ///
    /// Position failures here abort the move without a retry.
    fn plan(&self, source: Option<Zone>, target: Zone) -> Result<DragPlan, VeilError> {
        let separator_x = self
            .hiding
            .marker_x(MarkerKind::Separator)
            .ok_or_else(|| VeilError::PositionUnavailable("separator position unknown".to_string()))?;

        match target {
            // Coming from the left: drop just past the always-hidden separator.
            Zone::Hidden if source == Some(Zone::AlwaysHidden) => {
                self.ordered_always_hidden_x(separator_x)?;
                let always_hidden_right =
                    self.hiding.marker_right_edge(MarkerKind::AlwaysHiddenSeparator).ok_or_else(|| {
                        VeilError::PositionUnavailable("always-hidden separator edge unknown".to_string())
                    })?;
                Ok(DragPlan::to(always_hidden_right).not_right_of(separator_x))
            }
            Zone::Hidden => {
                let plan = DragPlan::to(separator_x);
                if !self.hiding.always_hidden_enabled() {
                    return Ok(plan);
                }
                let always_hidden_x = self.ordered_always_hidden_x(separator_x)?;
                Ok(plan.not_left_of(always_hidden_x + MarkerKind::AlwaysHiddenSeparator.visual_length()))
            }
            Zone::Visible => {
                let separator_right = self
                    .hiding
                    .marker_right_edge(MarkerKind::Separator)
                    .ok_or_else(|| VeilError::PositionUnavailable("separator edge unknown".to_string()))?;
                let main_x = self
                    .hiding
                    .marker_x(MarkerKind::Main)
                    .ok_or_else(|| VeilError::PositionUnavailable("main marker position unknown".to_string()))?;
                Ok(DragPlan::to(separator_right).not_right_of(main_x))
            }
            Zone::AlwaysHidden => {
                if !self.hiding.always_hidden_enabled() {
                    return Err(VeilError::PositionUnavailable("always-hidden zone is disabled".to_string()));
                }
                Ok(DragPlan::to(self.ordered_always_hidden_x(separator_x)?))
            }
        }
    }

    fn ordered_always_hidden_x(&self, separator_x: f64) -> Result<f64, VeilError> {
        let always_hidden_x = self.hiding.marker_x(MarkerKind::AlwaysHiddenSeparator).ok_or_else(|| {
            VeilError::PositionUnavailable("always-hidden separator position unknown".to_string())
        })?;

        if always_hidden_x >= separator_x {
            return Err(VeilError::PositionUnavailable(format!(
                "always-hidden separator ({always_hidden_x}) is not left of separator ({separator_x})"
            )));
        }
        Ok(always_hidden_x)
    }

    fn locate(&self, identity: &IconIdentity) -> Option<HostedIcon> {
        self.accessibility
            .hosted_icons()
            .into_iter()
            .find(|icon| &icon.identity == identity)
    }

    /// Zone of the icon's live position, or of `icon` when it cannot be located.
    fn source_zone(&self, icon: &HostedIcon) -> Option<Zone> {
        let bounds = self.hiding.boundaries()?;
        let current = self.locate(&icon.identity);
        Some(bounds.classify(current.as_ref().unwrap_or(icon)))
    }

    fn current_zone(&self, identity: &IconIdentity) -> Option<Zone> {
        let icon = self.locate(identity)?;
        self.hiding.boundaries().map(|bounds| bounds.classify(&icon))
    }

    fn verify(&self, identity: &IconIdentity, target: Zone) -> Result<(), VeilError> {
        let icon = self
            .locate(identity)
            .ok_or_else(|| VeilError::VerificationFailed("icon no longer hosted".to_string()))?;
        let bounds = self
            .hiding
            .boundaries()
            .ok_or_else(|| VeilError::VerificationFailed("separator position unknown".to_string()))?;

        match bounds.classify(&icon) {
            zone if zone == target => Ok(()),
            zone => Err(VeilError::VerificationFailed(format!("icon landed in {zone} zone"))),
        }
    }
}

/// Clears the active slot when the worker finishes.
struct ActiveClear {
    orchestrator: Arc<MoveOrchestrator>,
    id: Uuid,
}

impl Drop for ActiveClear {
    fn drop(&mut self) {
        let mut active = self.orchestrator.active.lock();
        if active.as_ref().is_some_and(|task| task.id == self.id) {
            *active = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menubar::IconIdentity;
    use crate::platform::ManualClock;
    use crate::platform::sim::{RecordingNotifier, ScriptedAuthenticator, SimulatedStatusBar};

    struct Harness {
        bar: Arc<SimulatedStatusBar>,
        hiding: Arc<HidingStateMachine>,
        mover: Arc<MoveOrchestrator>,
        auth: Arc<ScriptedAuthenticator>,
        clock: Arc<ManualClock>,
    }

    fn harness_with_clock(clock: ManualClock) -> Harness {
        let bar = Arc::new(SimulatedStatusBar::new());
        let clock = Arc::new(clock);
        let auth = Arc::new(ScriptedAuthenticator::answering(true));
        let hiding = Arc::new(HidingStateMachine::new(bar.clone(), clock.clone(), Duration::ZERO));
        hiding.install(true).unwrap();
        let gate = Arc::new(AuthGate::new(auth.clone(), clock.clone()));
        let mover = Arc::new(MoveOrchestrator::new(
            hiding.clone(),
            bar.clone(),
            bar.clone(),
            Arc::new(RecordingNotifier::default()),
            clock.clone(),
            gate,
        ));
        Harness { bar, hiding, mover, auth, clock }
    }

    fn harness() -> Harness { harness_with_clock(ManualClock::auto()) }

    fn icon(owner: &str, x: f64) -> HostedIcon { HostedIcon::new(IconIdentity::owner(owner), x, 22.0) }

    #[tokio::test]
    async fn test_move_to_hidden_while_expanded() {
        let h = harness();
        let app = icon("com.example.app", 700.0);
        h.bar.add_icon(app.clone());

        assert!(h.mover.move_icon(app.clone(), Zone::Hidden).await);

        assert_eq!(h.bar.drags().len(), 1);
        let zone = h.hiding.boundaries().unwrap().classify(&h.bar.icon(&app.identity).unwrap());
        assert_eq!(zone, Zone::Hidden);
        assert_eq!(h.clock.sleeps()[0], EXPANDED_SETTLE);
        assert!(!h.mover.is_moving());
    }

    #[tokio::test]
    async fn test_move_to_hidden_while_hidden_uses_cached_separator() {
        let h = harness();
        let app = icon("com.example.app", 700.0);
        h.bar.add_icon(app.clone());
        h.hiding.hide().await.unwrap();

        assert!(h.mover.move_icon(app, Zone::Hidden).await);

        let plan = h.bar.drags()[0];
        assert!((plan.target_x - 600.0).abs() < f64::EPSILON);
        assert_eq!(plan.min_x, Some(320.0));
        assert!(h.clock.sleeps().contains(&SHIELD_SETTLE));
        assert_eq!(h.hiding.state(), HidingState::Hidden);
        assert!(!h.hiding.is_shielded());
        assert_eq!(h.hiding.shield_counts(), (1, 1));
        assert_eq!(h.bar.marker_length(MarkerKind::Separator), Some(super::super::marker::BLOCKING_LENGTH));
    }

    #[tokio::test]
    async fn test_move_to_visible_clamps_at_main() {
        let h = harness();
        let app = icon("com.example.app", 450.0);
        h.bar.add_icon(app.clone());

        assert!(h.mover.move_icon(app, Zone::Visible).await);

        let plan = h.bar.drags()[0];
        assert!((plan.target_x - 620.0).abs() < f64::EPSILON);
        assert_eq!(plan.max_x, Some(900.0));
    }

    #[tokio::test]
    async fn test_move_to_always_hidden() {
        let h = harness();
        let app = icon("com.example.app", 450.0);
        h.bar.add_icon(app.clone());

        assert!(h.mover.move_icon(app.clone(), Zone::AlwaysHidden).await);
        let zone = h.hiding.boundaries().unwrap().classify(&h.bar.icon(&app.identity).unwrap());
        assert_eq!(zone, Zone::AlwaysHidden);
    }

    #[tokio::test]
    async fn test_move_out_of_always_hidden_into_hidden() {
        let h = harness();
        h.mover.set_require_authentication(true);
        let app = icon("com.example.app", 100.0);
        h.bar.add_icon(app.clone());
        let bounds = h.hiding.boundaries().unwrap();
        assert_eq!(bounds.classify(&app), Zone::AlwaysHidden);

        assert!(h.mover.move_icon(app.clone(), Zone::Hidden).await);

        let drags = h.bar.drags();
        assert_eq!(drags.len(), 1);
        assert!((drags[0].target_x - 320.0).abs() < f64::EPSILON);
        assert_eq!(drags[0].min_x, None);
        assert_eq!(drags[0].max_x, Some(600.0));
        assert_eq!(bounds.classify(&h.bar.icon(&app.identity).unwrap()), Zone::Hidden);
        assert_eq!(h.auth.prompts(), 0);
    }

    #[tokio::test]
    async fn test_move_out_of_always_hidden_into_visible_needs_authentication() {
        let h = harness();
        h.mover.set_require_authentication(true);
        h.auth.set_answer(false);
        let app = icon("com.example.app", 100.0);
        h.bar.add_icon(app.clone());

        assert!(!h.mover.move_icon(app.clone(), Zone::Visible).await);
        assert_eq!(h.auth.prompts(), 1);
        assert!(h.bar.drags().is_empty());

        h.auth.set_answer(true);
        assert!(h.mover.move_icon(app.clone(), Zone::Visible).await);

        let drags = h.bar.drags();
        assert_eq!(drags.len(), 1);
        assert!((drags[0].target_x - 620.0).abs() < f64::EPSILON);
        assert_eq!(drags[0].max_x, Some(900.0));
        let zone = h.hiding.boundaries().unwrap().classify(&h.bar.icon(&app.identity).unwrap());
        assert_eq!(zone, Zone::Visible);
    }

    #[tokio::test]
    async fn test_reveal_check_uses_live_position() {
        let h = harness();
        h.mover.set_require_authentication(true);
        h.auth.set_answer(false);
        h.bar.add_icon(icon("com.example.app", 450.0));
        let stale = icon("com.example.app", 700.0);

        assert!(!h.mover.move_icon(stale, Zone::Visible).await);
        assert_eq!(h.auth.prompts(), 1);
        assert!(h.bar.drags().is_empty());
    }

    #[tokio::test]
    async fn test_second_move_is_rejected_while_first_outstanding() {
        let h = harness_with_clock(ManualClock::manual());
        let first = icon("com.example.first", 700.0);
        let second = icon("com.example.second", 720.0);
        h.bar.add_icon(first.clone());
        h.bar.add_icon(second.clone());

        let handle = h.mover.start_move(first, Zone::Hidden).unwrap();
        assert!(!h.mover.move_icon(second, Zone::Hidden).await);
        assert!(h.mover.active_move().is_some());

        for _ in 0..5 {
            tokio::task::yield_now().await;
            h.clock.advance(Duration::from_secs(1));
        }
        assert!(handle.wait().await);
        assert!(h.mover.active_move().is_none());
        assert_eq!(h.bar.drags().len(), 1);
    }

    #[tokio::test]
    async fn test_retry_is_bounded_to_two_attempts() {
        let h = harness();
        let app = icon("com.example.app", 700.0);
        h.bar.add_icon(app.clone());
        h.bar.ignore_drags(usize::MAX);

        assert!(!h.mover.move_icon(app, Zone::Hidden).await);

        assert_eq!(h.bar.drags().len(), 2);
        assert_eq!(h.clock.sleeps().iter().filter(|d| **d == RETRY_DELAY).count(), 1);
    }

    #[tokio::test]
    async fn test_retry_recovers_after_one_failure() {
        let h = harness();
        let app = icon("com.example.app", 700.0);
        h.bar.add_icon(app.clone());
        h.bar.ignore_drags(1);

        assert!(h.mover.move_icon(app, Zone::Hidden).await);
        assert_eq!(h.bar.drags().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_move_while_hidden_still_restores_shield() {
        let h = harness();
        let app = icon("com.example.app", 700.0);
        h.bar.add_icon(app.clone());
        h.bar.ignore_drags(usize::MAX);
        h.hiding.hide().await.unwrap();

        assert!(!h.mover.move_icon(app, Zone::Hidden).await);

        assert_eq!(h.hiding.shield_counts(), (1, 1));
        assert_eq!(h.bar.marker_length(MarkerKind::Separator), Some(super::super::marker::BLOCKING_LENGTH));
        assert_eq!(h.bar.warps().len(), 1);
    }

    #[tokio::test]
    async fn test_inverted_markers_abort_without_retry() {
        let h = harness();
        h.bar.place_marker(MarkerKind::AlwaysHiddenSeparator, 650.0);
        let app = icon("com.example.app", 450.0);
        h.bar.add_icon(app.clone());

        assert!(!h.mover.move_icon(app, Zone::AlwaysHidden).await);
        assert!(h.bar.drags().is_empty());
    }

    #[tokio::test]
    async fn test_no_display_fails_before_anything() {
        let h = harness();
        h.bar.disconnect_display();
        let app = icon("com.example.app", 700.0);
        h.bar.add_icon(app.clone());

        assert!(!h.mover.move_icon(app, Zone::Hidden).await);
        assert!(h.clock.sleeps().is_empty());
        assert!(h.bar.warps().is_empty());
    }

    #[tokio::test]
    async fn test_missing_permission_is_a_noop() {
        let h = harness();
        h.bar.set_permission(false);
        let app = icon("com.example.app", 700.0);
        h.bar.add_icon(app.clone());

        assert!(!h.mover.move_icon(app, Zone::Hidden).await);
        assert!(h.bar.drags().is_empty());
    }

    #[tokio::test]
    async fn test_reveal_requires_authentication_under_privacy() {
        let h = harness();
        h.mover.set_require_authentication(true);
        h.auth.set_answer(false);
        let app = icon("com.example.app", 450.0);
        h.bar.add_icon(app.clone());

        assert!(!h.mover.move_icon(app.clone(), Zone::Visible).await);
        assert_eq!(h.auth.prompts(), 1);
        assert!(h.bar.drags().is_empty());
        assert!(h.clock.sleeps().is_empty());

        h.auth.set_answer(true);
        assert!(h.mover.move_icon(app, Zone::Visible).await);
        assert_eq!(h.auth.prompts(), 2);
    }

    #[tokio::test]
    async fn test_hiding_does_not_require_authentication() {
        let h = harness();
        h.mover.set_require_authentication(true);
        h.auth.set_answer(false);
        let app = icon("com.example.app", 700.0);
        h.bar.add_icon(app.clone());

        assert!(h.mover.move_icon(app, Zone::Hidden).await);
        assert_eq!(h.auth.prompts(), 0);
    }

    #[tokio::test]
    async fn test_move_and_wait_serializes_behind_outstanding_move() {
        let h = harness_with_clock(ManualClock::manual());
        let first = icon("com.example.first", 700.0);
        let second = icon("com.example.second", 760.0);
        h.bar.add_icon(first.clone());
        h.bar.add_icon(second.clone());

        let handle = h.mover.start_move(first, Zone::Hidden).unwrap();
        let waiting = tokio::spawn({
            let mover = Arc::clone(&h.mover);
            async move { mover.move_and_wait(second, Zone::Hidden).await }
        });

        for _ in 0..20 {
            tokio::task::yield_now().await;
            h.clock.advance(Duration::from_secs(1));
        }
        assert!(handle.wait().await);
        assert!(waiting.await.unwrap());
        assert_eq!(h.bar.drags().len(), 2);
    }
}
