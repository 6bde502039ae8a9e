//! Integration tests for modsynth-patch.
//!
//! Loads the bundled default patch, reads patches from disk, and checks that
//! parsed graphs produce the expected sample stream.

use std::io::Write;

use modsynth_core::{
    AudioSink, ControlCategory, NodeId, NodeKind, SinkConfig, SinkError, WriteStatus,
};
use modsynth_patch::{PatchError, load_graph, parse_patch, parse_patch_file, write_patch};

const DEFAULT_PATCH: &str = include_str!("../../../patches/default.patch");

#[derive(Default)]
struct Capture {
    samples: Vec<i16>,
}

impl AudioSink for Capture {
    fn configure(&mut self, sample_rate: u32) -> Result<SinkConfig, SinkError> {
        Ok(SinkConfig {
            sample_rate,
            period_size: 32,
        })
    }

    fn write(&mut self, samples: &[i16]) -> Result<WriteStatus, SinkError> {
        self.samples.extend_from_slice(samples);
        Ok(WriteStatus::Written)
    }

    fn prepare(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    fn drain_and_close(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

#[test]
fn default_patch_loads() {
    let graph = load_graph(DEFAULT_PATCH, 44100, 512).unwrap();
    assert_eq!(graph.len(), 11);

    let kinds: Vec<NodeKind> = graph.nodes().iter().map(|n| n.kind()).collect();
    assert_eq!(kinds[1], NodeKind::Oscillator);
    assert_eq!(kinds[4], NodeKind::Vca);
    assert_eq!(kinds[9], NodeKind::Filter);
    assert_eq!(kinds[10], NodeKind::OutputSink);

    let panel = graph.control_panel();
    assert_eq!(panel.category(0), Some(ControlCategory::Hfo));
    assert_eq!(panel.initial_value(0), Some(440.0));
    assert_eq!(panel.label(2), Some("Tremolo rate"));
    assert_eq!(panel.surfaced().count(), 5);
}

#[test]
fn default_patch_round_trips() {
    let graph = load_graph(DEFAULT_PATCH, 44100, 512).unwrap();
    let written = write_patch(&graph);
    assert_eq!(parse_patch(&written).unwrap(), parse_patch(DEFAULT_PATCH).unwrap());
}

#[test]
fn reference_sine_from_patch_text() {
    let mut graph = load_graph("0 CST 440.0 HFO freq\n1 OCC 0/0\n2 OUT 1/0\n", 8000, 32).unwrap();
    let mut sink = Capture::default();
    // ten seconds plus a partial period of 4 samples left unwritten
    for _ in 0..80_004 {
        graph.tick(&mut sink).unwrap();
    }
    assert_eq!(sink.samples.len(), 80_000);
    let buffered = graph
        .node(NodeId::new(2))
        .and_then(|n| n.output_buffer())
        .map(|b| b.fill());
    assert_eq!(buffered, Some(4));

    for (k, &s) in sink.samples.iter().enumerate() {
        let phase = std::f64::consts::TAU * 440.0 * k as f64 / 8000.0;
        let expected = (32767.0 * (0.5 + 0.5 * phase.sin())).round() as i32;
        assert!((i32::from(s) - expected).abs() <= 1, "sample {k}: {s} vs {expected}");
    }
}

#[test]
fn parse_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(DEFAULT_PATCH.as_bytes()).unwrap();
    let spec = parse_patch_file(file.path()).unwrap();
    assert_eq!(spec.len(), 11);
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.patch");
    let err = parse_patch_file(&path).unwrap_err();
    assert!(matches!(err, PatchError::Io { .. }));
    assert!(err.to_string().contains("absent.patch"));
}

#[test]
fn load_error_is_all_or_nothing() {
    let err = load_graph("0 CST 1 PER a\n1 OCC 0/0\n2 OUT 9/0\n", 8000, 32).unwrap_err();
    assert_eq!(err.line(), Some(3));
}
