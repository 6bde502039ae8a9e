//! Real-time scheduler: the synth session state machine.
//!
//! ```text
//! Starting ──► Running ──► Stopping ──► Stopped
//!    │            │                        ▲
//!    └─ error ────┴─ desync / sink error ──┘
//! ```
//!
//! - **Starting**: configure the sink for the target rate, build the graph
//!   with the negotiated period size, publish the control panel
//! - **Running**: tick once per sample, assess drift after every tick, sleep
//!   when ahead, fail when too far behind, poll the keep-running flag
//! - **Stopping**: drain and close the sink
//!
//! Every path ends in `Stopped`, so a controller blocked in
//! [`Liveness::wait_running()`] always wakes up.

use std::time::Duration;

use modsynth_core::{AudioSink, Graph};
use modsynth_patch::PatchSpec;

use crate::clock::{Clock, SystemClock};
use crate::liveness::{Liveness, RunState};
use crate::pacing::{PaceAction, Pacing};
use crate::{Error, Result};

/// Counters from a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Samples produced (graph ticks).
    pub samples: u64,
    /// Periods handed to the sink.
    pub periods: u64,
    /// Writes the sink reported as underruns.
    pub underruns: u64,
    /// Pacing sleeps taken.
    pub sleeps: u64,
    /// Wall time spent in `Running`.
    pub elapsed: Duration,
}

impl RunStats {
    pub(crate) fn collect(graph: &Graph, sleeps: u64, elapsed: Duration) -> Self {
        let (periods, underruns) = graph
            .nodes()
            .iter()
            .filter_map(|n| n.output_buffer())
            .fold((0, 0), |(p, u), b| (p + b.periods_written(), u + b.underruns()));
        Self {
            samples: graph.ticks(),
            periods,
            underruns,
            sleeps,
            elapsed,
        }
    }
}

/// Drives a graph in real time.
#[derive(Debug, Clone)]
pub struct Scheduler<C: Clock = SystemClock> {
    clock: C,
    pacing: Pacing,
    sample_rate: u32,
    stop_after: Option<u64>,
}

impl Scheduler<SystemClock> {
    /// A scheduler paced against the system clock.
    pub fn new(sample_rate: u32, pacing: Pacing) -> Self {
        Self::with_clock(SystemClock::new(), sample_rate, pacing)
    }
}

impl<C: Clock> Scheduler<C> {
    /// A scheduler paced against `clock`.
    pub fn with_clock(clock: C, sample_rate: u32, pacing: Pacing) -> Self {
        Self {
            clock,
            pacing,
            sample_rate,
            stop_after: None,
        }
    }

    /// Stops on its own after `samples` ticks.
    pub fn stop_after(mut self, samples: u64) -> Self {
        self.stop_after = Some(samples);
        self
    }

    /// Pacing thresholds in use.
    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Runs a full session: start, run until stopped, drain.
    ///
    /// Always leaves `liveness` in [`RunState::Stopped`].
    pub fn run<S: AudioSink + ?Sized>(
        &self,
        patch: &PatchSpec,
        sink: &mut S,
        liveness: &Liveness,
    ) -> Result<RunStats> {
        let result = self.session(patch, sink, liveness);
        if let Err(err) = &result {
            tracing::error!(error = %err, "synth session failed");
        }
        liveness.set_state(RunState::Stopped);
        result
    }

    fn session<S: AudioSink + ?Sized>(
        &self,
        patch: &PatchSpec,
        sink: &mut S,
        liveness: &Liveness,
    ) -> Result<RunStats> {
        liveness.set_state(RunState::Starting);
        let config = sink.configure(self.sample_rate)?;
        if config.sample_rate != self.sample_rate {
            tracing::warn!(
                requested = self.sample_rate,
                actual = config.sample_rate,
                "device rate differs from requested rate"
            );
        }
        tracing::info!(
            sample_rate = config.sample_rate,
            period_size = config.period_size,
            nodes = patch.len(),
            "sink configured"
        );
        let mut graph = patch.build(config.sample_rate, config.period_size)?;

        liveness.publish_running(graph.control_panel());
        let stats = match self.drive(&mut graph, sink, liveness) {
            Ok(stats) => stats,
            Err(err @ Error::Desync { .. }) => return Err(err),
            Err(err) => {
                liveness.set_state(RunState::Stopping);
                if let Err(close) = sink.drain_and_close() {
                    tracing::warn!(error = %close, "sink failed to close after error");
                }
                return Err(err);
            }
        };

        liveness.set_state(RunState::Stopping);
        sink.drain_and_close()?;
        tracing::info!(
            samples = stats.samples,
            periods = stats.periods,
            underruns = stats.underruns,
            "synth stopped"
        );
        Ok(stats)
    }

    /// The `Running` loop on an already built graph.
    ///
    /// Ticks until the keep-running flag clears or the sample limit is
    /// reached. Sound time is measured from the graph's current tick count at
    /// entry, at the graph's own sample rate.
    pub fn drive<S: AudioSink + ?Sized>(
        &self,
        graph: &mut Graph,
        sink: &mut S,
        liveness: &Liveness,
    ) -> Result<RunStats> {
        let rate = graph.sample_rate();
        let start = self.clock.now();
        let first = graph.ticks();
        let mut samples: u64 = 0;
        let mut sleeps: u64 = 0;

        while liveness.keep_running() {
            if self.stop_after.is_some_and(|limit| graph.ticks() >= limit) {
                break;
            }
            graph.tick(sink)?;
            samples += 1;

            let wall = self.clock.now().saturating_sub(start);
            match self.pacing.assess(samples, rate, wall) {
                PaceAction::Continue => {}
                PaceAction::Sleep(duration) => {
                    sleeps += 1;
                    self.clock.sleep(duration);
                }
                PaceAction::Desync { behind } => {
                    let sample = first + samples;
                    tracing::error!(sample, behind = ?behind, "clock too far out of sync");
                    return Err(Error::Desync { sample, behind });
                }
            }
        }

        let elapsed = self.clock.now().saturating_sub(start);
        Ok(RunStats::collect(graph, sleeps, elapsed))
    }
}
