//! Synth thread: runs a [`Scheduler`] on its own OS thread.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use modsynth_core::{AudioSink, ControlPanel};
use modsynth_patch::PatchSpec;

use crate::liveness::{Liveness, RunState};
use crate::pacing::Pacing;
use crate::scheduler::{RunStats, Scheduler};
use crate::{Error, Result};

/// Default synthesis rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Parameters of a synth session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthSettings {
    /// Requested sample rate in Hz.
    pub sample_rate: u32,
    /// Drift thresholds.
    pub pacing: Pacing,
    /// Stop on its own after this many samples.
    pub stop_after: Option<u64>,
}

impl Default for SynthSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            pacing: Pacing::default(),
            stop_after: None,
        }
    }
}

/// Controller-side handle to a running synth thread.
///
/// Dropping the handle without [`join()`](Self::join) requests a stop and
/// waits for the thread.
#[derive(Debug)]
pub struct SynthHandle {
    liveness: Arc<Liveness>,
    thread: Option<JoinHandle<Result<RunStats>>>,
}

impl SynthHandle {
    /// Shared run state.
    pub fn liveness(&self) -> &Arc<Liveness> {
        &self.liveness
    }

    /// Current run state.
    pub fn state(&self) -> RunState {
        self.liveness.state()
    }

    /// Blocks until the graph is running and returns its control panel, or
    /// `None` if the session ended before that.
    pub fn wait_running(&self) -> Option<ControlPanel> {
        self.liveness.wait_running()
    }

    /// Asks the synth thread to stop. Does not wait.
    pub fn stop(&self) {
        self.liveness.request_stop();
    }

    /// Whether the thread has returned.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Waits for the thread and returns its outcome.
    pub fn join(mut self) -> Result<RunStats> {
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| Error::ThreadPanicked)?,
            None => Err(Error::ThreadPanicked),
        }
    }
}

impl Drop for SynthHandle {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.liveness.request_stop();
            if thread.join().is_err() {
                tracing::error!("synth thread panicked");
            }
        }
    }
}

/// Starts a synth session on a new thread.
///
/// `make_sink` runs on the synth thread, so sinks that must stay on the thread
/// that created them (cpal streams) are supported. A sink factory error ends
/// the session in `Stopped` and is returned by [`SynthHandle::join()`].
pub fn spawn_synth<S, F>(patch: PatchSpec, settings: SynthSettings, make_sink: F) -> Result<SynthHandle>
where
    S: AudioSink,
    F: FnOnce() -> Result<S> + Send + 'static,
{
    let liveness = Arc::new(Liveness::new());
    let shared = Arc::clone(&liveness);

    let thread = thread::Builder::new()
        .name("modsynth-synth".into())
        .spawn(move || {
            let mut sink = match make_sink() {
                Ok(sink) => sink,
                Err(err) => {
                    tracing::error!(error = %err, "could not open output");
                    shared.set_state(RunState::Stopped);
                    return Err(err);
                }
            };
            let mut scheduler = Scheduler::new(settings.sample_rate, settings.pacing);
            if let Some(limit) = settings.stop_after {
                scheduler = scheduler.stop_after(limit);
            }
            scheduler.run(&patch, &mut sink, &shared)
        })?;

    Ok(SynthHandle {
        liveness,
        thread: Some(thread),
    })
}
