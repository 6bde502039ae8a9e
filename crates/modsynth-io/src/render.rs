//! Offline rendering: evaluate a patch as fast as possible.

use std::time::Instant;

use modsynth_core::AudioSink;
use modsynth_patch::PatchSpec;

use crate::Result;
use crate::scheduler::RunStats;

/// Renders at least `samples` samples of `patch` into `sink`, without pacing.
///
/// The tick count is rounded up to a whole number of periods so every
/// produced sample reaches the sink. The sink is drained and closed at the
/// end.
pub fn render_offline<S: AudioSink + ?Sized>(
    patch: &PatchSpec,
    sample_rate: u32,
    samples: u64,
    sink: &mut S,
) -> Result<RunStats> {
    let config = sink.configure(sample_rate)?;
    let mut graph = patch.build(config.sample_rate, config.period_size)?;

    let period = config.period_size as u64;
    let ticks = samples.div_ceil(period) * period;
    tracing::debug!(requested = samples, ticks, period, "offline render");

    let started = Instant::now();
    for _ in 0..ticks {
        graph.tick(sink)?;
    }
    sink.drain_and_close()?;

    let stats = RunStats::collect(&graph, 0, started.elapsed());
    tracing::info!(
        samples = stats.samples,
        periods = stats.periods,
        elapsed = ?stats.elapsed,
        "render finished"
    );
    Ok(stats)
}
