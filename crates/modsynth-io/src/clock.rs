//! Wall-clock sources for the scheduler.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// A monotonic time source the scheduler paces against.
pub trait Clock {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;

    /// Blocks (or pretends to) for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Real time, measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Starts a clock at zero.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug, Default)]
struct ManualState {
    now: Duration,
    step: Duration,
    sleeps: Vec<Duration>,
}

/// Deterministic clock for tests.
///
/// Time only moves when told to: every [`now()`](Clock::now) call returns the
/// current time and then advances it by a fixed step, and
/// [`sleep()`](Clock::sleep) advances it by the requested duration. Clones
/// share state, so a test can keep one handle and give another to a scheduler.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    state: Arc<Mutex<ManualState>>,
}

impl ManualClock {
    /// A clock frozen at zero; only sleeps and [`advance()`](Self::advance) move it.
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock that advances by `step` after every read.
    pub fn with_step(step: Duration) -> Self {
        let clock = Self::new();
        clock.state.lock().step = step;
        clock
    }

    /// Moves time forward.
    pub fn advance(&self, by: Duration) {
        self.state.lock().now += by;
    }

    /// Current time, without stepping.
    pub fn peek(&self) -> Duration {
        self.state.lock().now
    }

    /// Every sleep requested so far.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.state.lock().sleeps.clone()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        let mut state = self.state.lock();
        let now = state.now;
        let step = state.step;
        state.now += step;
        now
    }

    fn sleep(&self, duration: Duration) {
        let mut state = self.state.lock();
        state.now += duration;
        state.sleeps.push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_steps_after_read() {
        let clock = ManualClock::with_step(Duration::from_millis(2));
        assert_eq!(clock.now(), Duration::ZERO);
        assert_eq!(clock.now(), Duration::from_millis(2));
        assert_eq!(clock.peek(), Duration::from_millis(4));
    }

    #[test]
    fn manual_clock_sleep_advances_and_records() {
        let clock = ManualClock::new();
        let shared = clock.clone();
        shared.sleep(Duration::from_millis(5));
        clock.advance(Duration::from_millis(1));
        assert_eq!(clock.now(), Duration::from_millis(6));
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(5)]);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
