//! Output-sink contract between the graph and an audio device.
//!
//! The graph's OutputSink node accumulates one sample per tick. When a full
//! period has been collected it quantizes the block to signed 16-bit and hands
//! it to an [`AudioSink`]. Implementations live outside this crate (a cpal
//! device, a WAV file, an in-memory recorder for tests).
//!
//! ## Lifecycle
//!
//! ```text
//! configure(rate) ─► write(period) ─► write(period) ─► ... ─► drain_and_close()
//!                        │
//!                        └─ Underrun ─► prepare() ─► write(period) ...
//! ```
//!
//! An underrun is recoverable: the caller re-prepares the sink and keeps going.

#[cfg(not(feature = "std"))]
use alloc::string::String;

/// Full-scale value for 16-bit quantization.
pub const I16_FULL_SCALE: f32 = 32767.0;

/// Parameters negotiated by [`AudioSink::configure()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Actual sample rate in Hz. May differ slightly from the requested rate.
    pub sample_rate: u32,
    /// Number of samples the sink expects per [`write()`](AudioSink::write).
    pub period_size: usize,
}

/// Outcome of a period write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    /// The block was accepted.
    Written,
    /// The device ran dry before this write. The block was dropped and the
    /// sink must be re-prepared before the next write.
    Underrun,
}

/// Errors reported by an output sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The device could not be opened or configured.
    Device(String),
    /// `write()` was called before `configure()`.
    NotConfigured,
    /// The block length does not match the negotiated period size.
    PeriodMismatch {
        /// Negotiated period size.
        expected: usize,
        /// Length of the block passed to `write()`.
        actual: usize,
    },
    /// The sink was already closed.
    Closed,
}

impl core::fmt::Display for SinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Device(msg) => write!(f, "audio device error: {msg}"),
            Self::NotConfigured => write!(f, "sink written before configure()"),
            Self::PeriodMismatch { expected, actual } => {
                write!(f, "period of {actual} samples, sink expects {expected}")
            }
            Self::Closed => write!(f, "sink already closed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SinkError {}

/// A destination for 16-bit mono sample periods.
///
/// Object-safe so the graph can drive `&mut dyn AudioSink`.
pub trait AudioSink {
    /// Negotiates the device for `sample_rate` and returns the actual rate and
    /// the period size every subsequent `write()` must use.
    fn configure(&mut self, sample_rate: u32) -> Result<SinkConfig, SinkError>;

    /// Writes one period of samples.
    fn write(&mut self, samples: &[i16]) -> Result<WriteStatus, SinkError>;

    /// Recovers from an underrun so writing can resume.
    fn prepare(&mut self) -> Result<(), SinkError>;

    /// Plays out whatever is queued and releases the device.
    fn drain_and_close(&mut self) -> Result<(), SinkError>;
}

impl<S: AudioSink + ?Sized> AudioSink for &mut S {
    fn configure(&mut self, sample_rate: u32) -> Result<SinkConfig, SinkError> {
        (**self).configure(sample_rate)
    }

    fn write(&mut self, samples: &[i16]) -> Result<WriteStatus, SinkError> {
        (**self).write(samples)
    }

    fn prepare(&mut self) -> Result<(), SinkError> {
        (**self).prepare()
    }

    fn drain_and_close(&mut self) -> Result<(), SinkError> {
        (**self).drain_and_close()
    }
}

/// Converts a nominal `[-1, 1]` sample to signed 16-bit.
///
/// Out-of-range input is clamped first, so `2.0` maps to `32767` instead of
/// wrapping. NaN maps to silence.
#[inline]
pub fn quantize(sample: f32) -> i16 {
    if sample.is_nan() {
        return 0;
    }
    libm::roundf(sample.clamp(-1.0, 1.0) * I16_FULL_SCALE) as i16
}

/// Quantizes `input` into `output`, element by element.
///
/// Only `min(input.len(), output.len())` samples are converted.
pub fn quantize_block(input: &[f32], output: &mut [i16]) {
    for (dst, &src) in output.iter_mut().zip(input) {
        *dst = quantize(src);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_full_scale() {
        assert_eq!(quantize(1.0), 32767);
        assert_eq!(quantize(-1.0), -32767);
        assert_eq!(quantize(0.0), 0);
    }

    #[test]
    fn quantize_rounds_to_nearest() {
        // 0.5 * 32767 = 16383.5, rounds away from zero
        assert_eq!(quantize(0.5), 16384);
        assert_eq!(quantize(-0.5), -16384);
    }

    #[test]
    fn quantize_clamps_out_of_range() {
        assert_eq!(quantize(2.0), 32767);
        assert_eq!(quantize(-7.5), -32767);
        assert_eq!(quantize(f32::INFINITY), 32767);
        assert_eq!(quantize(f32::NAN), 0);
    }

    #[test]
    fn quantize_block_stops_at_shorter_slice() {
        let input = [0.0, 1.0, -1.0];
        let mut output = [7i16; 2];
        quantize_block(&input, &mut output);
        assert_eq!(output, [0, 32767]);
    }

    #[test]
    fn sink_error_display() {
        let err = SinkError::PeriodMismatch {
            expected: 64,
            actual: 32,
        };
        assert_eq!(err.to_string(), "period of 32 samples, sink expects 64");
    }
}
