//! Real-time playback with a terminal controller.

use std::io;
use std::sync::Arc;

use clap::Args;
use modsynth_config::SynthConfig;
use modsynth_io::{CpalSink, Error, SynthSettings, spawn_synth};

use super::common::{AudioOverrides, PatchArg, pacing, seconds_to_samples};
use crate::controller::{print_controls, run_controller};

#[derive(Args)]
pub struct PlayArgs {
    #[command(flatten)]
    patch: PatchArg,

    #[command(flatten)]
    audio: AudioOverrides,

    /// Output device (index, exact name, or partial name)
    #[arg(short, long)]
    output: Option<String>,

    /// Stop after this many seconds
    #[arg(short, long)]
    seconds: Option<f64>,

    /// Do not read control commands from stdin
    #[arg(long)]
    no_controller: bool,
}

pub fn run(args: PlayArgs, config: &SynthConfig) -> anyhow::Result<()> {
    let config = args.audio.apply(config)?;
    let patch = args.patch.load()?;
    let device = args.output.or_else(|| config.device.clone());
    let period = config.period_size;

    let settings = SynthSettings {
        sample_rate: config.sample_rate,
        pacing: pacing(&config)?,
        stop_after: args
            .seconds
            .map(|s| seconds_to_samples(s, config.sample_rate))
            .transpose()?,
    };
    tracing::info!(
        patch = %args.patch.display_name(),
        sample_rate = settings.sample_rate,
        period,
        device = device.as_deref().unwrap_or("default"),
        "starting synth"
    );

    let synth = spawn_synth(patch, settings, move || CpalSink::open(device.as_deref(), period))?;

    let liveness = Arc::clone(synth.liveness());
    ctrlc::set_handler(move || {
        eprintln!("\nStopping...");
        liveness.request_stop();
    })?;

    match synth.wait_running() {
        Some(panel) => {
            println!("Playing {}. Press Ctrl+C to stop.\n", args.patch.display_name());
            print_controls(&panel, &mut io::stdout())?;
            if !args.no_controller {
                println!("\nType 'help' for commands.");
                let liveness = Arc::clone(synth.liveness());
                // stdin reads block; the thread is left behind when the synth stops
                std::thread::Builder::new()
                    .name("modsynth-controller".into())
                    .spawn(move || {
                        let stdin = io::stdin();
                        if let Err(err) = run_controller(stdin.lock(), io::stdout(), &panel, &liveness)
                        {
                            tracing::warn!(error = %err, "controller stopped");
                        }
                    })?;
            }
            synth.liveness().wait_stopped();
        }
        None => tracing::debug!("synth stopped before running"),
    }

    match synth.join() {
        Ok(stats) => {
            println!(
                "Played {} samples ({} periods, {} underruns).",
                stats.samples, stats.periods, stats.underruns
            );
            Ok(())
        }
        Err(err @ Error::Desync { .. }) => {
            tracing::error!(error = %err, "aborting");
            eprintln!("fatal: {err}");
            std::process::abort();
        }
        Err(err) => Err(err.into()),
    }
}
