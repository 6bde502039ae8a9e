//! Audio device output through cpal.
//!
//! The synth thread and the device callback are joined by a bounded
//! crossbeam channel of `i16` samples:
//!
//! ```text
//! synth thread ──write(period)──► [ bounded<i16> ] ──try_recv──► cpal callback
//! ```
//!
//! `write()` blocks while the queue is full, which gives the scheduler
//! back-pressure on top of its own pacing. The callback copies each mono
//! sample to every channel of a frame and plays silence when the queue is
//! empty. Running dry after the first sample arrived raises an underrun flag
//! that the next `write()` reports.
//!
//! A device that refuses the requested rate is opened at its default rate
//! instead; the scheduler then builds the graph for that rate.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, StreamTrait};
use crossbeam_channel::{Receiver, SendTimeoutError, Sender};
use modsynth_core::{AudioSink, I16_FULL_SCALE, SinkConfig, SinkError, WriteStatus};

use crate::Result;
use crate::device::{device_name, find_output_device};

/// Queue depth in periods.
const QUEUE_PERIODS: usize = 8;

/// Longest a single sample may wait for queue space.
const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// Poll interval while draining.
const DRAIN_POLL: Duration = Duration::from_millis(5);

#[derive(Debug, Default)]
struct Flags {
    underrun: AtomicBool,
    primed: AtomicBool,
}

/// Sink that plays 16-bit mono periods on an output device.
///
/// `cpal::Stream` is not `Send` on every platform, so the sink is opened on
/// the thread that will drive it (see [`spawn_synth()`](crate::spawn_synth)).
pub struct CpalSink {
    device: cpal::Device,
    name: String,
    period_size: usize,
    sample_rate: u32,
    stream: Option<cpal::Stream>,
    tx: Option<Sender<i16>>,
    flags: Arc<Flags>,
    closed: bool,
}

impl CpalSink {
    /// Opens the output device matching `device` (index, name, or substring),
    /// or the default device when `None`.
    pub fn open(device: Option<&str>, period_size: usize) -> Result<Self> {
        let device = find_output_device(device)?;
        let name = device_name(&device).unwrap_or_else(|_| String::from("<unnamed>"));
        tracing::info!(device = %name, period_size, "output device selected");
        Ok(Self {
            device,
            name,
            period_size,
            sample_rate: 0,
            stream: None,
            tx: None,
            flags: Arc::new(Flags::default()),
            closed: false,
        })
    }

    /// Name of the selected device.
    pub fn device_name(&self) -> &str {
        &self.name
    }

    fn build_stream(
        &self,
        config: &cpal::StreamConfig,
        rx: Receiver<i16>,
    ) -> std::result::Result<cpal::Stream, cpal::BuildStreamError> {
        let flags = Arc::clone(&self.flags);
        let channels = usize::from(config.channels.max(1));
        self.device.build_output_stream(
            config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    let value = match rx.try_recv() {
                        Ok(s) => {
                            flags.primed.store(true, Ordering::Relaxed);
                            f32::from(s) / I16_FULL_SCALE
                        }
                        Err(_) => {
                            if flags.primed.load(Ordering::Relaxed) {
                                flags.underrun.store(true, Ordering::Relaxed);
                            }
                            0.0
                        }
                    };
                    frame.fill(value);
                }
            },
            move |err| {
                tracing::error!(error = %err, "output stream error");
            },
            None,
        )
    }
}

impl std::fmt::Debug for CpalSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpalSink")
            .field("device", &self.name)
            .field("period_size", &self.period_size)
            .field("sample_rate", &self.sample_rate)
            .field("streaming", &self.stream.is_some())
            .finish()
    }
}

fn device_error(err: impl std::fmt::Display) -> SinkError {
    SinkError::Device(err.to_string())
}

/// Stream configurations to try, in order: the requested rate with a fixed
/// then the default buffer size, then the same at the device's own rate.
fn stream_attempts(
    requested: u32,
    device_rate: Option<u32>,
    period: u32,
) -> Vec<(u32, cpal::BufferSize)> {
    let mut rates = vec![requested];
    if let Some(rate) = device_rate.filter(|&r| r != requested && r > 0) {
        rates.push(rate);
    }
    rates
        .into_iter()
        .flat_map(|rate| {
            [
                (rate, cpal::BufferSize::Fixed(period)),
                (rate, cpal::BufferSize::Default),
            ]
        })
        .collect()
}

impl AudioSink for CpalSink {
    /// Opens the stream at `sample_rate` when the device takes it, otherwise
    /// at the device's default rate, and reports the rate actually used.
    fn configure(&mut self, sample_rate: u32) -> std::result::Result<SinkConfig, SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        let default_config = self.device.default_output_config().ok();
        let channels = default_config.as_ref().map_or(2, |c| c.channels());
        let device_rate = default_config.as_ref().map(|c| c.sample_rate());
        let period = u32::try_from(self.period_size).map_err(device_error)?;
        let (tx, rx) = crossbeam_channel::bounded::<i16>(self.period_size * QUEUE_PERIODS);

        let mut opened = None;
        let mut last_error = None;
        for (rate, buffer_size) in stream_attempts(sample_rate, device_rate, period) {
            let config = cpal::StreamConfig {
                channels,
                sample_rate: rate,
                buffer_size,
            };
            match self.build_stream(&config, rx.clone()) {
                Ok(stream) => {
                    opened = Some((stream, rate));
                    break;
                }
                Err(e) => {
                    tracing::warn!(error = %e, rate, ?buffer_size, "stream configuration rejected");
                    last_error = Some(e);
                }
            }
        }
        let Some((stream, rate)) = opened else {
            return Err(last_error.map_or_else(
                || SinkError::Device("no stream configuration to try".into()),
                device_error,
            ));
        };
        stream.play().map_err(device_error)?;
        tracing::info!(
            device = %self.name,
            channels,
            sample_rate = rate,
            "output stream started"
        );

        self.stream = Some(stream);
        self.tx = Some(tx);
        self.sample_rate = rate;
        Ok(SinkConfig {
            sample_rate: rate,
            period_size: self.period_size,
        })
    }

    fn write(&mut self, samples: &[i16]) -> std::result::Result<WriteStatus, SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        let tx = self.tx.as_ref().ok_or(SinkError::NotConfigured)?;
        if samples.len() != self.period_size {
            return Err(SinkError::PeriodMismatch {
                expected: self.period_size,
                actual: samples.len(),
            });
        }
        if self.flags.underrun.load(Ordering::Relaxed) {
            return Ok(WriteStatus::Underrun);
        }
        for &s in samples {
            match tx.send_timeout(s, WRITE_TIMEOUT) {
                Ok(()) => {}
                Err(SendTimeoutError::Timeout(_)) => {
                    return Err(SinkError::Device("output queue stalled".into()));
                }
                Err(SendTimeoutError::Disconnected(_)) => {
                    return Err(SinkError::Device("output stream disconnected".into()));
                }
            }
        }
        Ok(WriteStatus::Written)
    }

    fn prepare(&mut self) -> std::result::Result<(), SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        self.flags.primed.store(false, Ordering::Relaxed);
        self.flags.underrun.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn drain_and_close(&mut self) -> std::result::Result<(), SinkError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if let Some(tx) = self.tx.take() {
            let queued = tx.len();
            let budget = Duration::from_secs_f64(
                queued as f64 / f64::from(self.sample_rate.max(1)),
            ) + WRITE_TIMEOUT;
            let deadline = Instant::now() + budget;
            while !tx.is_empty() && Instant::now() < deadline {
                std::thread::sleep(DRAIN_POLL);
            }
            if !tx.is_empty() {
                tracing::warn!(left = tx.len(), "output queue not drained before close");
            }
        }
        self.stream = None;
        tracing::info!(device = %self.name, "output stream closed");
        Ok(())
    }
}
