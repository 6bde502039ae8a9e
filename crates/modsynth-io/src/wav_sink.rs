//! WAV file output.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader, WavWriter};
use modsynth_core::{AudioSink, SinkConfig, SinkError, WriteStatus};

use crate::Result;

/// Sink that writes 16-bit mono PCM to a WAV file.
///
/// The file is created by `configure()`, once the sample rate is known, and
/// finalized by `drain_and_close()`. A file sink never underruns.
pub struct WavSink {
    path: PathBuf,
    period_size: usize,
    writer: Option<WavWriter<BufWriter<File>>>,
    closed: bool,
}

impl WavSink {
    /// Prepares a sink that will write to `path` in periods of `period_size`.
    pub fn create<P: AsRef<Path>>(path: P, period_size: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            period_size,
            writer: None,
            closed: false,
        }
    }

    /// Output path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for WavSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WavSink")
            .field("path", &self.path)
            .field("period_size", &self.period_size)
            .field("open", &self.writer.is_some())
            .finish()
    }
}

fn wav_error(err: hound::Error) -> SinkError {
    SinkError::Device(err.to_string())
}

impl AudioSink for WavSink {
    fn configure(&mut self, sample_rate: u32) -> std::result::Result<SinkConfig, SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        self.writer = Some(WavWriter::create(&self.path, spec).map_err(wav_error)?);
        tracing::debug!(path = %self.path.display(), sample_rate, "wav output opened");
        Ok(SinkConfig {
            sample_rate,
            period_size: self.period_size,
        })
    }

    fn write(&mut self, samples: &[i16]) -> std::result::Result<WriteStatus, SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        if samples.len() != self.period_size {
            return Err(SinkError::PeriodMismatch {
                expected: self.period_size,
                actual: samples.len(),
            });
        }
        let writer = self.writer.as_mut().ok_or(SinkError::NotConfigured)?;
        for &s in samples {
            writer.write_sample(s).map_err(wav_error)?;
        }
        Ok(WriteStatus::Written)
    }

    fn prepare(&mut self) -> std::result::Result<(), SinkError> {
        Ok(())
    }

    fn drain_and_close(&mut self) -> std::result::Result<(), SinkError> {
        self.closed = true;
        if let Some(writer) = self.writer.take() {
            writer.finalize().map_err(wav_error)?;
            tracing::debug!(path = %self.path.display(), "wav output finalized");
        }
        Ok(())
    }
}

/// Reads a 16-bit mono WAV file back as samples and sample rate.
pub fn read_wav_i16<P: AsRef<Path>>(path: P) -> Result<(Vec<i16>, u32)> {
    let reader = WavReader::open(path)?;
    let rate = reader.spec().sample_rate;
    let samples = reader
        .into_samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((samples, rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_and_finalizes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let mut sink = WavSink::create(&path, 3);
        assert_eq!(sink.write(&[1, 2, 3]), Err(SinkError::NotConfigured));

        let cfg = sink.configure(8000).unwrap();
        assert_eq!(cfg.period_size, 3);
        sink.write(&[1, -2, 32767]).unwrap();
        sink.write(&[0, 0, -32767]).unwrap();
        sink.drain_and_close().unwrap();
        assert_eq!(sink.write(&[1, 2, 3]), Err(SinkError::Closed));

        let (samples, rate) = read_wav_i16(&path).unwrap();
        assert_eq!(rate, 8000);
        assert_eq!(samples, vec![1, -2, 32767, 0, 0, -32767]);
    }

    #[test]
    fn rejects_wrong_period() {
        let dir = tempdir().unwrap();
        let mut sink = WavSink::create(dir.path().join("x.wav"), 4);
        sink.configure(8000).unwrap();
        assert!(matches!(
            sink.write(&[1, 2]),
            Err(SinkError::PeriodMismatch { expected: 4, actual: 2 })
        ));
    }
}
