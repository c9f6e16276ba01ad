//! Time source abstraction.
//!
//! Every suspension point in the engine (settle after a marker resize, settle
//! after a simulated drag, retry delay, rehide delay, auth lockout) goes
//! through [`Clock`], so the whole engine can be driven without real timers.

use std::time::{Duration, Instant};

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use parking_lot::Mutex;
use tokio::sync::oneshot;

/// Time source and cooperative timed waits.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;

    /// Returns a future that resolves after `duration`.
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// Production clock backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant { Instant::now() }

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        tokio::time::sleep(duration).boxed()
    }
}

/// A pending sleep on a [`ManualClock`].
struct Sleeper {
    deadline: Instant,
    wake: oneshot::Sender<()>,
}

struct ManualState {
    now: Instant,
    sleeps: Vec<Duration>,
    sleepers: Vec<Sleeper>,
}

/// Deterministic clock for simulations and tests.
///
/// In auto-advance mode every `sleep` moves time forward by its duration and
/// resolves immediately. In manual mode sleeps stay pending until
/// [`ManualClock::advance`] moves time past their deadline.
pub struct ManualClock {
    auto_advance: bool,
    state: Mutex<ManualState>,
}

impl ManualClock {
    /// Creates a clock whose sleeps complete immediately.
    #[must_use]
    pub fn auto() -> Self { Self::with_mode(true) }

    /// Creates a clock whose sleeps wait for [`Self::advance`].
    #[must_use]
    pub fn manual() -> Self { Self::with_mode(false) }

    fn with_mode(auto_advance: bool) -> Self {
        Self {
            auto_advance,
            state: Mutex::new(ManualState {
                now: Instant::now(),
                sleeps: Vec::new(),
                sleepers: Vec::new(),
            }),
        }
    }

    /// Moves time forward and wakes every sleeper whose deadline has passed.
    pub fn advance(&self, duration: Duration) {
        let mut state = self.state.lock();
        state.now += duration;
        let now = state.now;

        let (due, pending): (Vec<_>, Vec<_>) =
            state.sleepers.drain(..).partition(|sleeper| sleeper.deadline <= now);
        state.sleepers = pending;
        drop(state);

        for sleeper in due {
            let _ = sleeper.wake.send(());
        }
    }

    /// Every duration passed to `sleep`, in call order.
    #[must_use]
    pub fn sleeps(&self) -> Vec<Duration> { self.state.lock().sleeps.clone() }

    /// Number of sleeps still waiting for time to advance.
    #[must_use]
    pub fn pending_sleepers(&self) -> usize { self.state.lock().sleepers.len() }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant { self.state.lock().now }

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        let mut state = self.state.lock();
        state.sleeps.push(duration);

        if self.auto_advance {
            state.now += duration;
            return future::ready(()).boxed();
        }

        if duration.is_zero() {
            return future::ready(()).boxed();
        }

        let (wake, woken) = oneshot::channel();
        let deadline = state.now + duration;
        state.sleepers.push(Sleeper { deadline, wake });

        async move {
            let _ = woken.await;
        }
        .boxed()
    }
}
