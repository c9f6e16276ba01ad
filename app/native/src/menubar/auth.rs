//! Rate-limited authentication gate for revealing hidden icons.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;

use crate::error::VeilError;
use crate::platform::{Authenticator, Clock};

/// Consecutive failures that trip the lockout.
pub const MAX_FAILED_ATTEMPTS: u32 = 5;

/// How long the gate stays locked once tripped.
pub const LOCKOUT_DURATION: Duration = Duration::from_secs(30);

/// Observable gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthState {
    Unlocked,
    Challenging,
    LockedOut,
}

#[derive(Debug, Default)]
struct Failures {
    count: u32,
    locked_until: Option<Instant>,
}

/// Gate in front of hidden-to-visible transitions.
///
/// A success never changes hiding state by itself; callers decide what to do
/// with the result.
pub struct AuthGate {
    authenticator: Arc<dyn Authenticator>,
    clock: Arc<dyn Clock>,
    failures: Mutex<Failures>,
    challenging: AtomicBool,
}

impl AuthGate {
    #[must_use]
    pub fn new(authenticator: Arc<dyn Authenticator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            authenticator,
            clock,
            failures: Mutex::new(Failures::default()),
            challenging: AtomicBool::new(false),
        }
    }

    /// Presents a challenge unless locked out or another one is showing.
    ///
    /// # Errors
    ///
    /// - [`VeilError::AuthLockedOut`] inside the lockout window (no prompt shown)
    /// - [`VeilError::Busy`] while another challenge is in flight
    /// - [`VeilError::AuthFailed`] if the user did not pass the challenge
    pub async fn authenticate(&self, reason: &str) -> Result<(), VeilError> {
        self.check_lockout()?;

        if self
            .challenging
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(VeilError::Busy("authentication already in progress".to_string()));
        }
        let _challenging = ChallengeGuard(&self.challenging);

        let passed = self.authenticator.challenge(reason).await;
        let mut failures = self.failures.lock();

        if passed {
            failures.count = 0;
            failures.locked_until = None;
            return Ok(());
        }

        failures.count += 1;
        if failures.count >= MAX_FAILED_ATTEMPTS {
            failures.locked_until = Some(self.clock.now() + LOCKOUT_DURATION);
            tracing::warn!(attempts = failures.count, "authentication locked out");
        } else {
            tracing::debug!(attempts = failures.count, "authentication failed");
        }
        Err(VeilError::AuthFailed)
    }

    /// Current state of the gate.
    #[must_use]
    pub fn state(&self) -> AuthState {
        if self.challenging.load(Ordering::SeqCst) {
            return AuthState::Challenging;
        }
        match self.failures.lock().locked_until {
            Some(until) if self.clock.now() < until => AuthState::LockedOut,
            _ => AuthState::Unlocked,
        }
    }

    /// Consecutive failures counted towards the lockout.
    #[must_use]
    pub fn failed_attempts(&self) -> u32 { self.failures.lock().count }

    fn check_lockout(&self) -> Result<(), VeilError> {
        let mut failures = self.failures.lock();
        let Some(until) = failures.locked_until else {
            return Ok(());
        };

        let now = self.clock.now();
        if now < until {
            let remaining = until - now;
            return Err(VeilError::AuthLockedOut {
                remaining_secs: remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0),
            });
        }

        failures.count = 0;
        failures.locked_until = None;
        tracing::debug!("authentication lockout expired");
        Ok(())
    }
}

struct ChallengeGuard<'a>(&'a AtomicBool);

impl Drop for ChallengeGuard<'_> {
    fn drop(&mut self) { self.0.store(false, Ordering::SeqCst); }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use futures::FutureExt;
    use futures::future::BoxFuture;
    use tokio::sync::Notify;

    use super::*;
    use crate::platform::ManualClock;

    struct ScriptedAuthenticator {
        answer: AtomicBool,
        prompts: AtomicUsize,
        release: Option<Arc<Notify>>,
    }

    impl ScriptedAuthenticator {
        fn answering(answer: bool) -> Self {
            Self {
                answer: AtomicBool::new(answer),
                prompts: AtomicUsize::new(0),
                release: None,
            }
        }

        fn prompts(&self) -> usize { self.prompts.load(Ordering::SeqCst) }
    }

    impl Authenticator for ScriptedAuthenticator {
        fn challenge(&self, _reason: &str) -> BoxFuture<'static, bool> {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            let answer = self.answer.load(Ordering::SeqCst);
            let release = self.release.clone();
            async move {
                if let Some(release) = release {
                    release.notified().await;
                }
                answer
            }
            .boxed()
        }
    }

    fn gate(answer: bool) -> (AuthGate, Arc<ScriptedAuthenticator>, Arc<ManualClock>) {
        let authenticator = Arc::new(ScriptedAuthenticator::answering(answer));
        let clock = Arc::new(ManualClock::manual());
        (AuthGate::new(authenticator.clone(), clock.clone()), authenticator, clock)
    }

    #[tokio::test]
    async fn test_success_passes() {
        let (gate, authenticator, _) = gate(true);
        gate.authenticate("reveal").await.unwrap();
        assert_eq!(authenticator.prompts(), 1);
        assert_eq!(gate.state(), AuthState::Unlocked);
    }

    #[tokio::test]
    async fn test_lockout_after_five_failures() {
        let (gate, authenticator, clock) = gate(false);

        for _ in 0..MAX_FAILED_ATTEMPTS {
            assert_eq!(gate.authenticate("reveal").await, Err(VeilError::AuthFailed));
        }
        assert_eq!(gate.state(), AuthState::LockedOut);

        let err = gate.authenticate("reveal").await.unwrap_err();
        assert_eq!(err, VeilError::AuthLockedOut { remaining_secs: 30 });
        assert_eq!(authenticator.prompts(), 5);

        clock.advance(Duration::from_secs(31));
        assert_eq!(gate.authenticate("reveal").await, Err(VeilError::AuthFailed));
        assert_eq!(authenticator.prompts(), 6);
        assert_eq!(gate.failed_attempts(), 1);
    }

    #[tokio::test]
    async fn test_success_resets_counter() {
        let (gate, authenticator, _) = gate(false);
        for _ in 0..4 {
            let _ = gate.authenticate("reveal").await;
        }
        authenticator.answer.store(true, Ordering::SeqCst);
        gate.authenticate("reveal").await.unwrap();
        assert_eq!(gate.failed_attempts(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_challenge_is_rejected() {
        let release = Arc::new(Notify::new());
        let authenticator = Arc::new(ScriptedAuthenticator {
            answer: AtomicBool::new(true),
            prompts: AtomicUsize::new(0),
            release: Some(release.clone()),
        });
        let gate = Arc::new(AuthGate::new(authenticator.clone(), Arc::new(ManualClock::manual())));

        let first = tokio::spawn({
            let gate = Arc::clone(&gate);
            async move { gate.authenticate("reveal").await }
        });
        tokio::task::yield_now().await;
        assert_eq!(gate.state(), AuthState::Challenging);

        assert!(gate.authenticate("reveal").await.unwrap_err().is_busy());
        assert_eq!(authenticator.prompts(), 1);

        release.notify_one();
        first.await.unwrap().unwrap();
        assert_eq!(gate.state(), AuthState::Unlocked);
    }
}
