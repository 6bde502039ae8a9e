//! Shared CLI helpers used across multiple commands.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use modsynth_config::SynthConfig;
use modsynth_io::Pacing;
use modsynth_patch::{PatchSpec, parse_patch, parse_patch_file};

/// Patch used when no file is given.
pub const DEFAULT_PATCH: &str = include_str!("../../../../patches/default.patch");

/// Patch file selection shared by every patch-consuming command.
#[derive(Args, Debug)]
pub struct PatchArg {
    /// Patch file (defaults to the built-in voice)
    #[arg(value_name = "PATCH")]
    pub patch: Option<PathBuf>,
}

impl PatchArg {
    /// Loads the selected patch.
    pub fn load(&self) -> anyhow::Result<PatchSpec> {
        load_patch(self.patch.as_deref())
    }

    /// Name for messages.
    pub fn display_name(&self) -> String {
        self.patch
            .as_ref()
            .map_or_else(|| "<built-in>".to_string(), |p| p.display().to_string())
    }
}

/// Loads `path`, or the built-in patch when `None`.
pub fn load_patch(path: Option<&Path>) -> anyhow::Result<PatchSpec> {
    match path {
        Some(path) => parse_patch_file(path)
            .with_context(|| format!("failed to load patch '{}'", path.display())),
        None => parse_patch(DEFAULT_PATCH).context("built-in patch is invalid"),
    }
}

/// Audio settings that may override the configuration file.
#[derive(Args, Debug, Default)]
pub struct AudioOverrides {
    /// Sample rate in Hz
    #[arg(short, long)]
    pub rate: Option<u32>,

    /// Period size in samples
    #[arg(short = 'b', long)]
    pub period: Option<usize>,
}

impl AudioOverrides {
    /// Applies the overrides on top of `config` and re-validates.
    pub fn apply(&self, config: &SynthConfig) -> anyhow::Result<SynthConfig> {
        let mut merged = config.clone();
        if let Some(rate) = self.rate {
            merged.sample_rate = rate;
        }
        if let Some(period) = self.period {
            merged.period_size = period;
        }
        merged.validate().context("invalid audio settings")?;
        Ok(merged)
    }
}

/// Scheduler pacing from the configuration.
pub fn pacing(config: &SynthConfig) -> anyhow::Result<Pacing> {
    Ok(Pacing::new(
        config.pacing.ahead_tolerance(),
        config.pacing.behind_limit(),
    )?)
}

/// Number of samples in `seconds` at `sample_rate`, rounded up.
pub fn seconds_to_samples(seconds: f64, sample_rate: u32) -> anyhow::Result<u64> {
    if !seconds.is_finite() || seconds < 0.0 {
        anyhow::bail!("duration must be a non-negative number of seconds, got {seconds}");
    }
    Ok((seconds * f64::from(sample_rate)).ceil() as u64)
}
