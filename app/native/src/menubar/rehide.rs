//! Delayed re-hide after a reveal.
//!
//! At most one timer is armed at a time; arming again replaces the pending
//! one, cancelling aborts it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::platform::Clock;

/// Single-slot cancellable timer.
pub struct RehideTimer {
    clock: Arc<dyn Clock>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl RehideTimer {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self { Self { clock, pending: Mutex::new(None) } }

    /// Runs `action` after `delay` unless cancelled or re-armed first.
    pub fn arm<F>(&self, delay: Duration, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let sleep = self.clock.sleep(delay);
        let handle = tokio::spawn(async move {
            sleep.await;
            action.await;
        });

        if let Some(previous) = self.pending.lock().replace(handle) {
            previous.abort();
        }
        tracing::trace!(?delay, "rehide armed");
    }

    /// Cancels the pending re-hide, if any.
    pub fn cancel(&self) {
        if let Some(handle) = self.pending.lock().take() {
            handle.abort();
            tracing::trace!("rehide cancelled");
        }
    }

    /// Whether a re-hide is waiting to fire.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.pending.lock().as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for RehideTimer {
    fn drop(&mut self) { self.cancel(); }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::platform::ManualClock;

    fn counter_action(counter: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        let counter = Arc::clone(counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_fires_after_delay() {
        let clock = Arc::new(ManualClock::manual());
        let timer = RehideTimer::new(clock.clone());
        let fired = Arc::new(AtomicUsize::new(0));

        timer.arm(Duration::from_secs(5), counter_action(&fired));
        tokio::task::yield_now().await;
        assert!(timer.is_armed());
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        clock.advance(Duration::from_secs(5));
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!timer.is_armed());
    }

    #[tokio::test]
    async fn test_cancel_prevents_firing() {
        let clock = Arc::new(ManualClock::manual());
        let timer = RehideTimer::new(clock.clone());
        let fired = Arc::new(AtomicUsize::new(0));

        timer.arm(Duration::from_secs(5), counter_action(&fired));
        timer.cancel();
        clock.advance(Duration::from_secs(10));
        tokio::task::yield_now().await;

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(!timer.is_armed());
    }

    #[tokio::test]
    async fn test_rearm_replaces_pending() {
        let clock = Arc::new(ManualClock::manual());
        let timer = RehideTimer::new(clock.clone());
        let fired = Arc::new(AtomicUsize::new(0));

        timer.arm(Duration::from_secs(5), counter_action(&fired));
        timer.arm(Duration::from_secs(5), counter_action(&fired));
        clock.advance(Duration::from_secs(5));
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
