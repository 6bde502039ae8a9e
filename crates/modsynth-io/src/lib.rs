//! Real-time driving and audio output for modsynth graphs.
//!
//! This crate provides:
//!
//! - **Scheduler**: [`Scheduler`] runs the `Starting → Running → Stopping →
//!   Stopped` state machine, ticking a graph once per sample and pacing it
//!   against a [`Clock`]
//! - **Synth thread**: [`spawn_synth`] runs a scheduler on its own thread and
//!   hands the caller a [`SynthHandle`] for control and shutdown
//! - **Output sinks**: [`CpalSink`] (audio device), [`WavSink`] (16-bit mono
//!   WAV file), [`MemorySink`] (in-memory recorder for tests)
//! - **Offline rendering**: [`render_offline`] evaluates a patch as fast as
//!   possible, without wall-clock pacing
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use modsynth_io::{CpalSink, SynthSettings, spawn_synth};
//! use modsynth_patch::parse_patch;
//!
//! let patch = parse_patch(&std::fs::read_to_string("patches/default.patch")?)?;
//! let synth = spawn_synth(patch, SynthSettings::default(), || CpalSink::open(None, 512))?;
//! let panel = synth.wait_running().expect("synth failed to start");
//! panel.set_value(0, 880.0)?;
//! synth.stop();
//! synth.join()?;
//! ```

mod clock;
mod cpal_sink;
mod device;
mod liveness;
mod memory_sink;
mod pacing;
mod render;
mod runner;
mod scheduler;
mod wav_sink;

use std::time::Duration;

pub use clock::{Clock, ManualClock, SystemClock};
pub use cpal_sink::CpalSink;
pub use device::{AudioDevice, default_output_device, list_output_devices};
pub use liveness::{Liveness, RunState};
pub use memory_sink::{MemorySink, Recording, RecordingHandle};
pub use pacing::{DEFAULT_AHEAD_TOLERANCE, DEFAULT_BEHIND_LIMIT, PaceAction, Pacing, sound_time};
pub use render::render_offline;
pub use runner::{DEFAULT_SAMPLE_RATE, SynthHandle, SynthSettings, spawn_synth};
pub use scheduler::{RunStats, Scheduler};
pub use wav_sink::{WavSink, read_wav_i16};

/// Error types for scheduling and audio output.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The patch could not be loaded.
    #[error(transparent)]
    Patch(#[from] modsynth_patch::PatchError),

    /// The output sink failed.
    #[error(transparent)]
    Sink(#[from] modsynth_core::SinkError),

    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Synthesis fell too far behind real time.
    #[error("synthesis fell {behind:?} behind real time at sample {sample}")]
    Desync {
        /// Sample count when the limit was exceeded.
        sample: u64,
        /// How far sound time trailed wall time.
        behind: Duration,
    },

    /// The ahead tolerance is not below the behind limit.
    #[error("pacing ahead tolerance {ahead:?} must be below behind limit {behind:?}")]
    InvalidPacing {
        /// Ahead tolerance.
        ahead: Duration,
        /// Behind limit.
        behind: Duration,
    },

    /// The synth thread panicked.
    #[error("synth thread panicked")]
    ThreadPanicked,

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for scheduling and audio output.
pub type Result<T> = std::result::Result<T, Error>;
