//! Offline rendering to a WAV file.

use std::path::PathBuf;

use clap::Args;
use modsynth_config::SynthConfig;
use modsynth_io::{WavSink, render_offline};

use super::common::{AudioOverrides, PatchArg, seconds_to_samples};

#[derive(Args)]
pub struct RenderArgs {
    #[command(flatten)]
    patch: PatchArg,

    #[command(flatten)]
    audio: AudioOverrides,

    /// Output WAV file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Duration in seconds
    #[arg(short, long, default_value = "5.0")]
    seconds: f64,
}

pub fn run(args: RenderArgs, config: &SynthConfig) -> anyhow::Result<()> {
    let config = args.audio.apply(config)?;
    let patch = args.patch.load()?;
    let samples = seconds_to_samples(args.seconds, config.sample_rate)?;

    let mut sink = WavSink::create(&args.output, config.period_size);
    let stats = render_offline(&patch, config.sample_rate, samples, &mut sink)?;

    println!(
        "Rendered {} to {} ({} samples, {:.2}s at {} Hz, {:.1?})",
        args.patch.display_name(),
        args.output.display(),
        stats.samples,
        stats.samples as f64 / f64::from(config.sample_rate),
        config.sample_rate,
        stats.elapsed,
    );
    Ok(())
}
