//! Menu bar hiding engine.
//!
//! [`MenuBarController`] is the single coordination object: it owns the
//! hiding state machine, the move orchestrator, the pin enforcer, the auth
//! gate and the auto-rehide timer, and exposes the operations callers use.
//! Every platform facility is injected through [`ControllerDeps`].

pub mod auth;
pub mod enforcer;
pub mod hiding;
pub mod icon;
pub mod marker;
pub mod mover;
pub mod pin_store;
pub mod pins;
pub mod position;
pub mod rehide;
pub mod zone;

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;

pub use auth::{AuthGate, AuthState};
pub use enforcer::{EnforcementReport, EnforcementSkip, PinEnforcer};
pub use hiding::{HidingSnapshot, HidingState, HidingStateMachine, ShieldGuard};
pub use icon::{DragPlan, HostedIcon, IconIdentity};
pub use marker::{BLOCKING_LENGTH, BLOCKING_THRESHOLD, MarkerFrame, MarkerKind, Point, is_blocking};
pub use mover::{ActiveMoveInfo, MoveHandle, MoveOrchestrator};
pub use pin_store::{JsonPinStore, MemoryPinStore, PinStore};
pub use pins::{PinParseError, PinnedIdentifier};
pub use position::PositionCache;
pub use rehide::RehideTimer;
pub use zone::{Zone, ZoneBoundaries};

use crate::config::VeilConfig;
use crate::error::VeilError;
use crate::events;
use crate::platform::{
    AccessibilityService, Authenticator, Clock, Notifier, PointerDevice, WindowShell,
};

const REVEAL_REASON: &str = "Show hidden menu bar icons";

/// Platform collaborators for a [`MenuBarController`].
#[derive(Clone)]
pub struct ControllerDeps {
    pub shell: Arc<dyn WindowShell>,
    pub accessibility: Arc<dyn AccessibilityService>,
    pub pointer: Arc<dyn PointerDevice>,
    pub authenticator: Arc<dyn Authenticator>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
    pub pin_store: Arc<dyn PinStore>,
}

/// User interactions that keep icons revealed.
#[derive(Debug, Default, Clone, Copy)]
struct Interaction {
    menu_open: bool,
    dragging: bool,
}

/// Point-in-time view of the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerSnapshot {
    pub hiding: HidingSnapshot,
    pub auth: AuthState,
    pub active_move: Option<ActiveMoveInfo>,
    pub rehide_armed: bool,
    pub always_hidden_enabled: bool,
}

struct Inner {
    shell: Arc<dyn WindowShell>,
    notifier: Arc<dyn Notifier>,
    pin_store: Arc<dyn PinStore>,
    hiding: Arc<HidingStateMachine>,
    auth: Arc<AuthGate>,
    mover: Arc<MoveOrchestrator>,
    enforcer: PinEnforcer,
    rehide: RehideTimer,
    config: Mutex<VeilConfig>,
    interaction: Mutex<Interaction>,
}

/// Entry point to the hiding engine. Cheap to clone.
#[derive(Clone)]
pub struct MenuBarController {
    inner: Arc<Inner>,
}

impl MenuBarController {
    /// Wires the engine together. Markers are created by [`Self::install`].
    #[must_use]
    pub fn new(deps: ControllerDeps, config: VeilConfig) -> Self {
        let hiding = Arc::new(HidingStateMachine::new(
            deps.shell.clone(),
            deps.clock.clone(),
            config.hiding.animation_settle(),
        ));
        let auth = Arc::new(AuthGate::new(deps.authenticator, deps.clock.clone()));
        let mover = Arc::new(MoveOrchestrator::new(
            hiding.clone(),
            deps.accessibility.clone(),
            deps.pointer,
            deps.notifier.clone(),
            deps.clock.clone(),
            auth.clone(),
        ));
        mover.set_require_authentication(config.privacy.is_enabled());

        let enforcer = PinEnforcer::new(
            hiding.clone(),
            mover.clone(),
            deps.accessibility,
            deps.pin_store.clone(),
            deps.notifier.clone(),
        );

        Self {
            inner: Arc::new(Inner {
                shell: deps.shell,
                notifier: deps.notifier,
                pin_store: deps.pin_store,
                hiding,
                auth,
                mover,
                enforcer,
                rehide: RehideTimer::new(deps.clock),
                config: Mutex::new(config),
                interaction: Mutex::new(Interaction::default()),
            }),
        }
    }

    /// Creates the markers.
    ///
    /// # Errors
    ///
    /// Returns [`VeilError::PositionUnavailable`] if the shell refuses a marker.
    pub fn install(&self) -> Result<(), VeilError> {
        let always_hidden = self.inner.config.lock().always_hidden.is_enabled();
        self.inner.hiding.install(always_hidden)
    }

    /// Applies a reloaded configuration.
    pub fn apply_config(&self, config: VeilConfig) {
        self.inner.mover.set_require_authentication(config.privacy.is_enabled());
        let always_hidden = config.always_hidden.is_enabled();
        *self.inner.config.lock() = config;
        self.set_always_hidden_enabled(always_hidden);
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> VeilConfig { self.inner.config.lock().clone() }

    /// Hiding state machine, for read-only inspection.
    #[must_use]
    pub fn hiding(&self) -> &Arc<HidingStateMachine> { &self.inner.hiding }

    /// Current logical state.
    #[must_use]
    pub fn state(&self) -> HidingState { self.inner.hiding.state() }

    #[must_use]
    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            hiding: self.inner.hiding.snapshot(),
            auth: self.inner.auth.state(),
            active_move: self.inner.mover.active_move(),
            rehide_armed: self.inner.rehide.is_armed(),
            always_hidden_enabled: self.inner.hiding.always_hidden_enabled(),
        }
    }

    // ========================================================================
    // Visibility
    // ========================================================================

    /// Shows when hidden, hides when expanded.
    ///
    /// # Errors
    ///
    /// See [`Self::show`] and [`Self::hide`].
    pub async fn toggle(&self) -> Result<HidingState, VeilError> {
        match self.state() {
            HidingState::Hidden => self.show().await?,
            HidingState::Expanded => self.hide().await?,
        }
        Ok(self.state())
    }

    /// Reveals hidden icons and arms the auto-rehide.
    ///
    /// # Errors
    ///
    /// Returns an auth error when privacy mode rejects the reveal, or
    /// [`VeilError::Busy`] during another transition.
    pub async fn show(&self) -> Result<(), VeilError> {
        let privacy = self.inner.config.lock().privacy.is_enabled();
        if privacy && self.state() == HidingState::Hidden {
            self.inner.auth.authenticate(REVEAL_REASON).await?;
        }

        self.inner.hiding.show().await?;
        self.inner.notifier.emit(events::menubar::VISIBILITY_CHANGED);
        self.schedule_auto_rehide();
        Ok(())
    }

    /// Collapses hidden icons.
    ///
    /// # Errors
    ///
    /// Returns [`VeilError::Busy`] during another transition.
    pub async fn hide(&self) -> Result<(), VeilError> {
        self.inner.rehide.cancel();
        self.inner.hiding.set_reveal_pinned(false);
        self.inner.hiding.hide().await?;
        self.inner.notifier.emit(events::menubar::VISIBILITY_CHANGED);
        Ok(())
    }

    /// Arms a delayed hide. Returns `false` when a keep-open condition applies.
    pub fn schedule_rehide(&self, delay: Duration) -> bool {
        if let Some(why) = rehide_blocker(&self.inner) {
            tracing::debug!(why, "rehide not scheduled");
            self.inner.rehide.cancel();
            return false;
        }

        let weak = Arc::downgrade(&self.inner);
        self.inner.rehide.arm(delay, async move { rehide_fired(weak).await });
        true
    }

    /// Cancels a pending delayed hide.
    pub fn cancel_rehide(&self) { self.inner.rehide.cancel(); }

    #[must_use]
    pub fn is_rehide_armed(&self) -> bool { self.inner.rehide.is_armed() }

    // ========================================================================
    // Interaction hooks
    // ========================================================================

    /// Keeps icons revealed until [`Self::unpin_reveal`] or an explicit hide.
    pub fn pin_reveal(&self) {
        self.inner.hiding.set_reveal_pinned(true);
        self.inner.rehide.cancel();
    }

    pub fn unpin_reveal(&self) {
        self.inner.hiding.set_reveal_pinned(false);
        self.schedule_auto_rehide();
    }

    pub fn menu_opened(&self) {
        self.inner.interaction.lock().menu_open = true;
        self.inner.rehide.cancel();
    }

    pub fn menu_closed(&self) {
        self.inner.interaction.lock().menu_open = false;
        self.schedule_auto_rehide();
    }

    pub fn drag_started(&self) {
        self.inner.interaction.lock().dragging = true;
        self.inner.rehide.cancel();
    }

    pub fn drag_ended(&self) {
        self.inner.interaction.lock().dragging = false;
        self.schedule_auto_rehide();
    }

    fn schedule_auto_rehide(&self) {
        let hiding = self.inner.config.lock().hiding.clone();
        if hiding.auto_rehide && self.state() == HidingState::Expanded {
            self.schedule_rehide(hiding.rehide_delay());
        }
    }

    // ========================================================================
    // Moves
    // ========================================================================

    /// Zone of `icon` against the current marker positions.
    #[must_use]
    pub fn classify(&self, icon: &HostedIcon) -> Option<Zone> {
        self.inner.hiding.boundaries().map(|bounds| bounds.classify(icon))
    }

    /// Starts a move and returns its handle.
    ///
    /// # Errors
    ///
    /// Returns [`VeilError::Busy`] when another move or transition is in flight.
    pub fn start_move(&self, icon: HostedIcon, target: Zone) -> Result<MoveHandle, VeilError> {
        self.inner.mover.start_move(icon, target)
    }

    /// Moves `icon` into `target`; `false` on any failure or rejection.
    pub async fn move_icon(&self, icon: HostedIcon, target: Zone) -> bool {
        self.inner.mover.move_icon(icon, target).await
    }

    /// Waits for any outstanding move, then moves `icon`.
    pub async fn move_and_wait(&self, icon: HostedIcon, target: Zone) -> bool {
        self.inner.mover.move_and_wait(icon, target).await
    }

    // ========================================================================
    // Pins
    // ========================================================================

    /// Stored pin strings.
    ///
    /// # Errors
    ///
    /// Returns [`VeilError::PinStoreError`] if the store is unreadable.
    pub fn pins(&self) -> Result<Vec<String>, VeilError> { self.inner.pin_store.load() }

    /// Pins `icon` to the always-hidden zone and moves it there.
    ///
    /// Returns whether the icon ended up in the zone.
    ///
    /// # Errors
    ///
    /// Fails when the always-hidden zone is disabled or the pin cannot be
    /// persisted.
    pub async fn pin(&self, icon: &HostedIcon) -> Result<bool, VeilError> {
        if !self.inner.hiding.always_hidden_enabled() {
            return Err(VeilError::InvalidArguments("the always-hidden zone is disabled".to_string()));
        }

        let encoded = PinnedIdentifier::for_icon(&icon.identity).to_string();
        let mut pins = self.inner.pin_store.load()?;
        if !pins.contains(&encoded) {
            pins.push(encoded);
            self.inner.pin_store.save(&pins)?;
            self.inner.notifier.emit(events::menubar::PINS_CHANGED);
        }

        Ok(self.inner.mover.move_and_wait(icon.clone(), Zone::AlwaysHidden).await)
    }

    /// Removes every pin designating `identity`. The icon is not moved.
    ///
    /// Returns how many pins were removed.
    ///
    /// # Errors
    ///
    /// Fails when the store cannot be read or written.
    pub fn unpin(&self, identity: &IconIdentity) -> Result<usize, VeilError> {
        let pins = self.inner.pin_store.load()?;
        let before = pins.len();
        let kept: Vec<String> = pins
            .into_iter()
            .filter(|raw| !raw.parse::<PinnedIdentifier>().is_ok_and(|pin| pin.matches(identity)))
            .collect();

        let removed = before - kept.len();
        if removed > 0 {
            self.inner.pin_store.save(&kept)?;
            self.inner.notifier.emit(events::menubar::PINS_CHANGED);
        }
        Ok(removed)
    }

    /// Moves every drifted pinned icon back into the always-hidden zone.
    pub async fn enforce_pins(&self, reason: &str) -> EnforcementReport {
        self.inner.enforcer.enforce(reason, None).await
    }

    /// Like [`Self::enforce_pins`], restricted to one owner's icons.
    pub async fn enforce_pins_for(&self, reason: &str, owner_id: &str) -> EnforcementReport {
        self.inner.enforcer.enforce(reason, Some(owner_id)).await
    }

    /// Creates or removes the always-hidden separator.
    pub fn set_always_hidden_enabled(&self, enabled: bool) {
        self.inner.config.lock().always_hidden.enabled = enabled;
        self.inner.hiding.set_always_hidden_enabled(enabled);
    }
}

fn rehide_blocker(inner: &Inner) -> Option<&'static str> {
    if inner.hiding.is_reveal_pinned() {
        return Some("reveal pinned");
    }
    let interaction = *inner.interaction.lock();
    if interaction.menu_open {
        return Some("menu open");
    }
    if interaction.dragging {
        return Some("drag in progress");
    }
    let keep_on_external = inner.config.lock().hiding.keep_revealed_on_external_display;
    if keep_on_external && !inner.shell.active_display_is_builtin() {
        return Some("external display");
    }
    None
}

async fn rehide_fired(inner: Weak<Inner>) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    if inner.hiding.state() != HidingState::Expanded {
        return;
    }
    if let Some(why) = rehide_blocker(&inner) {
        tracing::debug!(why, "auto-rehide suppressed");
        return;
    }

    match inner.hiding.hide().await {
        Ok(()) => inner.notifier.emit(events::menubar::VISIBILITY_CHANGED),
        Err(err) => tracing::debug!(error = %err, "auto-rehide skipped"),
    }
}
