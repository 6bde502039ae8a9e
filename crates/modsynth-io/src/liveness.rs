//! Run state shared between the synth thread and its controller.
//!
//! Two pieces of state cross threads:
//!
//! - the **keep-running flag**, an `AtomicBool` the scheduler polls once per
//!   tick and the controller clears to request shutdown
//! - the **run state** (`Starting → Running → Stopping → Stopped`), published
//!   under a mutex with a condition variable so a controller can block until
//!   the graph exists instead of spinning

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use modsynth_core::ControlPanel;
use parking_lot::{Condvar, Mutex};

/// Lifecycle of a synth session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RunState {
    /// Configuring the sink and building the graph.
    Starting,
    /// Ticking the graph.
    Running,
    /// Draining and closing the sink.
    Stopping,
    /// Finished, normally or with an error.
    Stopped,
}

#[derive(Debug)]
struct Published {
    state: RunState,
    panel: Option<ControlPanel>,
}

/// Shared liveness and run state of one synth session.
#[derive(Debug)]
pub struct Liveness {
    keep_running: AtomicBool,
    published: Mutex<Published>,
    changed: Condvar,
}

impl Liveness {
    /// A session in `Starting` that has not been asked to stop.
    pub fn new() -> Self {
        Self {
            keep_running: AtomicBool::new(true),
            published: Mutex::new(Published {
                state: RunState::Starting,
                panel: None,
            }),
            changed: Condvar::new(),
        }
    }

    /// Whether the scheduler should keep ticking.
    #[inline]
    pub fn keep_running(&self) -> bool {
        self.keep_running.load(Ordering::Relaxed)
    }

    /// Asks the scheduler to stop after its current tick.
    pub fn request_stop(&self) {
        // held so a waiter cannot miss the wakeup between its check and wait
        let _published = self.published.lock();
        self.keep_running.store(false, Ordering::Relaxed);
        self.changed.notify_all();
    }

    /// Current run state.
    pub fn state(&self) -> RunState {
        self.published.lock().state
    }

    /// Blocks until the session is `Running` and returns its control panel.
    ///
    /// Returns `None` if the session stopped without ever running (device or
    /// patch error), or if a stop was requested first.
    pub fn wait_running(&self) -> Option<ControlPanel> {
        let mut published = self.published.lock();
        while published.state == RunState::Starting && self.keep_running() {
            self.changed.wait(&mut published);
        }
        match published.state {
            RunState::Running => published.panel.clone(),
            _ => None,
        }
    }

    /// Like [`wait_running()`](Self::wait_running) with a timeout.
    pub fn wait_running_for(&self, timeout: Duration) -> Option<ControlPanel> {
        let deadline = Instant::now() + timeout;
        let mut published = self.published.lock();
        while published.state == RunState::Starting && self.keep_running() {
            if self.changed.wait_until(&mut published, deadline).timed_out() {
                break;
            }
        }
        match published.state {
            RunState::Running => published.panel.clone(),
            _ => None,
        }
    }

    /// Blocks until the session reaches `Stopped`.
    pub fn wait_stopped(&self) {
        let mut published = self.published.lock();
        while published.state != RunState::Stopped {
            self.changed.wait(&mut published);
        }
    }

    pub(crate) fn publish_running(&self, panel: ControlPanel) {
        let mut published = self.published.lock();
        published.state = RunState::Running;
        published.panel = Some(panel);
        drop(published);
        self.changed.notify_all();
        tracing::info!(state = ?RunState::Running, "synth state");
    }

    pub(crate) fn set_state(&self, state: RunState) {
        let mut published = self.published.lock();
        if published.state == state {
            return;
        }
        published.state = state;
        drop(published);
        self.changed.notify_all();
        tracing::info!(state = ?state, "synth state");
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}
