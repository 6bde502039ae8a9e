//! modsynth CLI - play, render, and inspect modular synthesizer patches.

mod commands;
mod controller;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use modsynth_config::SynthConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "modsynth")]
#[command(author, version, about = "Modular synthesizer", long_about = None)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a patch on an audio device in real time
    Play(commands::play::PlayArgs),

    /// Render a patch to a WAV file
    Render(commands::render::RenderArgs),

    /// Validate a patch and summarize it
    Check(commands::check::CheckArgs),

    /// List a patch's controls
    Controls(commands::controls::ControlsArgs),

    /// List audio output devices
    Devices(commands::devices::DevicesArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = SynthConfig::load_or_default(cli.config.as_deref())?;
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Play(args) => commands::play::run(args, &config),
        Commands::Render(args) => commands::render::run(args, &config),
        Commands::Check(args) => commands::check::run(args, &config),
        Commands::Controls(args) => commands::controls::run(args, &config),
        Commands::Devices(args) => commands::devices::run(args),
    }
}
