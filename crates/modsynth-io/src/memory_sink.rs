//! In-memory sink that records everything written to it.

use std::collections::BTreeSet;
use std::sync::Arc;

use modsynth_core::{AudioSink, SinkConfig, SinkError, WriteStatus};
use parking_lot::Mutex;

/// Everything a [`MemorySink`] has seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recording {
    /// Rate passed to `configure()`, if it was called.
    pub sample_rate: Option<u32>,
    /// Accepted samples, in order.
    pub samples: Vec<i16>,
    /// Accepted writes.
    pub writes: usize,
    /// Every `write()` call, accepted or not.
    pub attempts: usize,
    /// Writes answered with an underrun.
    pub underruns: usize,
    /// `prepare()` calls.
    pub prepares: usize,
    /// Whether `drain_and_close()` was called.
    pub closed: bool,
}

/// Shared read access to a [`MemorySink`]'s recording.
///
/// Stays valid after the sink has moved to another thread.
#[derive(Debug, Clone)]
pub struct RecordingHandle {
    inner: Arc<Mutex<Recording>>,
}

impl RecordingHandle {
    /// Copy of the recording so far.
    pub fn snapshot(&self) -> Recording {
        self.inner.lock().clone()
    }
}

/// Sink that keeps every accepted period in memory.
///
/// Accepts whatever rate it is configured with. Chosen write attempts can be
/// made to report an underrun or to fail outright.
#[derive(Debug)]
pub struct MemorySink {
    period_size: usize,
    underrun_on: BTreeSet<usize>,
    fail_on: BTreeSet<usize>,
    pending_prepare: bool,
    recording: Arc<Mutex<Recording>>,
}

impl MemorySink {
    /// A sink with the given period size.
    pub fn new(period_size: usize) -> Self {
        Self {
            period_size,
            underrun_on: BTreeSet::new(),
            fail_on: BTreeSet::new(),
            pending_prepare: false,
            recording: Arc::new(Mutex::new(Recording::default())),
        }
    }

    /// Reports an underrun on these write attempts (zero-based).
    pub fn with_underruns(mut self, attempts: impl IntoIterator<Item = usize>) -> Self {
        self.underrun_on.extend(attempts);
        self
    }

    /// Fails these write attempts (zero-based) with a device error.
    pub fn with_failures(mut self, attempts: impl IntoIterator<Item = usize>) -> Self {
        self.fail_on.extend(attempts);
        self
    }

    /// Handle for reading the recording.
    pub fn recording(&self) -> RecordingHandle {
        RecordingHandle {
            inner: Arc::clone(&self.recording),
        }
    }
}

impl AudioSink for MemorySink {
    fn configure(&mut self, sample_rate: u32) -> Result<SinkConfig, SinkError> {
        self.recording.lock().sample_rate = Some(sample_rate);
        Ok(SinkConfig {
            sample_rate,
            period_size: self.period_size,
        })
    }

    fn write(&mut self, samples: &[i16]) -> Result<WriteStatus, SinkError> {
        let mut rec = self.recording.lock();
        if rec.closed {
            return Err(SinkError::Closed);
        }
        if rec.sample_rate.is_none() {
            return Err(SinkError::NotConfigured);
        }
        if samples.len() != self.period_size {
            return Err(SinkError::PeriodMismatch {
                expected: self.period_size,
                actual: samples.len(),
            });
        }
        if self.pending_prepare {
            return Err(SinkError::Device("write after underrun without prepare()".into()));
        }

        let attempt = rec.attempts;
        rec.attempts += 1;
        if self.fail_on.contains(&attempt) {
            return Err(SinkError::Device(format!("write {attempt} failed")));
        }
        if self.underrun_on.contains(&attempt) {
            rec.underruns += 1;
            self.pending_prepare = true;
            return Ok(WriteStatus::Underrun);
        }
        rec.samples.extend_from_slice(samples);
        rec.writes += 1;
        Ok(WriteStatus::Written)
    }

    fn prepare(&mut self) -> Result<(), SinkError> {
        self.pending_prepare = false;
        self.recording.lock().prepares += 1;
        Ok(())
    }

    fn drain_and_close(&mut self) -> Result<(), SinkError> {
        self.recording.lock().closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_periods() {
        let mut sink = MemorySink::new(2);
        let handle = sink.recording();
        assert_eq!(sink.write(&[1, 2]), Err(SinkError::NotConfigured));
        sink.configure(8000).unwrap();
        assert_eq!(sink.write(&[1, 2]).unwrap(), WriteStatus::Written);
        assert_eq!(sink.write(&[3, 4]).unwrap(), WriteStatus::Written);
        assert!(matches!(
            sink.write(&[5]),
            Err(SinkError::PeriodMismatch { expected: 2, actual: 1 })
        ));
        sink.drain_and_close().unwrap();
        assert_eq!(sink.write(&[5, 6]), Err(SinkError::Closed));

        let rec = handle.snapshot();
        assert_eq!(rec.sample_rate, Some(8000));
        assert_eq!(rec.samples, vec![1, 2, 3, 4]);
        assert_eq!(rec.writes, 2);
        assert!(rec.closed);
    }

    #[test]
    fn scripted_underrun_requires_prepare() {
        let mut sink = MemorySink::new(1).with_underruns([1]);
        sink.configure(8000).unwrap();
        assert_eq!(sink.write(&[1]).unwrap(), WriteStatus::Written);
        assert_eq!(sink.write(&[2]).unwrap(), WriteStatus::Underrun);
        assert!(sink.write(&[3]).is_err());
        sink.prepare().unwrap();
        assert_eq!(sink.write(&[3]).unwrap(), WriteStatus::Written);

        let rec = sink.recording().snapshot();
        assert_eq!(rec.samples, vec![1, 3]);
        assert_eq!(rec.underruns, 1);
        assert_eq!(rec.prepares, 1);
    }

    #[test]
    fn scripted_failure_rejects_write() {
        let mut sink = MemorySink::new(1).with_failures([1]);
        sink.configure(8000).unwrap();
        assert_eq!(sink.write(&[1]).unwrap(), WriteStatus::Written);
        assert!(matches!(sink.write(&[2]), Err(SinkError::Device(_))));
        assert_eq!(sink.write(&[3]).unwrap(), WriteStatus::Written);
        assert_eq!(sink.recording().snapshot().samples, vec![1, 3]);
    }
}
