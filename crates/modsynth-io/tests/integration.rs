//! Scheduler, synth thread, and sink integration tests.

use std::time::Duration;

use modsynth_io::{
    Error, Liveness, ManualClock, MemorySink, Pacing, RunState, Scheduler, SynthSettings, WavSink,
    read_wav_i16, render_offline, spawn_synth,
};
use modsynth_patch::parse_patch;
use tempfile::tempdir;

const SINE_1K: &str = "0 CST 1000 HFO Pitch\n1 OCC 0/0\n2 OUT 1/0\n";

#[test]
fn desync_fires_just_past_the_behind_limit() {
    // every clock read advances 2 ms while each sample is worth 1 ms,
    // so after sample n the scheduler trails by n ms
    let patch = parse_patch(SINE_1K).unwrap();
    let mut sink = MemorySink::new(10);
    let recording = sink.recording();
    let live = Liveness::new();
    let clock = ManualClock::with_step(Duration::from_millis(2));

    let err = Scheduler::with_clock(clock.clone(), 1000, Pacing::default())
        .run(&patch, &mut sink, &live)
        .unwrap_err();

    match err {
        Error::Desync { sample, behind } => {
            assert_eq!(sample, 251);
            assert_eq!(behind, Duration::from_millis(251));
        }
        other => panic!("expected desync, got {other}"),
    }
    assert!(clock.sleeps().is_empty());
    assert_eq!(live.state(), RunState::Stopped);
    // 25 full periods reached the sink, the partial one did not
    assert_eq!(recording.snapshot().samples.len(), 250);
}

#[test]
fn tighter_limit_desyncs_sooner() {
    let patch = parse_patch(SINE_1K).unwrap();
    let mut sink = MemorySink::new(10);
    let live = Liveness::new();
    let pacing = Pacing::new(Duration::from_millis(5), Duration::from_millis(50)).unwrap();
    let err = Scheduler::with_clock(ManualClock::with_step(Duration::from_millis(2)), 1000, pacing)
        .run(&patch, &mut sink, &live)
        .unwrap_err();
    assert!(matches!(err, Error::Desync { sample: 51, .. }));
}

#[test]
fn underrun_is_recovered_and_counted() {
    let patch = parse_patch(SINE_1K).unwrap();
    let mut sink = MemorySink::new(10).with_underruns([2]);
    let recording = sink.recording();
    let live = Liveness::new();

    let stats = Scheduler::with_clock(ManualClock::new(), 1000, Pacing::default())
        .stop_after(50)
        .run(&patch, &mut sink, &live)
        .unwrap();

    assert_eq!(stats.periods, 5);
    assert_eq!(stats.underruns, 1);
    let rec = recording.snapshot();
    assert_eq!(rec.attempts, 5);
    assert_eq!(rec.writes, 4);
    assert_eq!(rec.prepares, 1);
    assert_eq!(rec.samples.len(), 40);
    assert!(rec.closed);
}

#[test]
fn synth_thread_publishes_panel_and_stops() {
    let patch = parse_patch(SINE_1K).unwrap();
    let sink = MemorySink::new(64);
    let recording = sink.recording();
    let settings = SynthSettings {
        sample_rate: 8000,
        ..SynthSettings::default()
    };

    let synth = spawn_synth(patch, settings, move || Ok(sink)).unwrap();
    let panel = synth.wait_running().expect("synth should reach Running");
    assert_eq!(panel.node_count(), 3);
    assert_eq!(panel.label(0), Some("Pitch"));
    panel.set_value(0, 2000.0).unwrap();
    assert_eq!(panel.value(0), Some(2000.0));

    std::thread::sleep(Duration::from_millis(30));
    synth.stop();
    let stats = synth.join().unwrap();
    assert!(stats.samples > 0);

    let rec = recording.snapshot();
    assert_eq!(rec.sample_rate, Some(8000));
    assert!(rec.closed);
}

#[test]
fn synth_thread_honours_sample_limit() {
    let patch = parse_patch(SINE_1K).unwrap();
    let settings = SynthSettings {
        sample_rate: 8000,
        stop_after: Some(800),
        ..SynthSettings::default()
    };
    let synth = spawn_synth(patch, settings, || Ok(MemorySink::new(100))).unwrap();
    let stats = synth.join().unwrap();
    assert_eq!(stats.samples, 800);
    assert_eq!(stats.periods, 8);
}

#[test]
fn sink_factory_failure_ends_in_stopped() {
    let patch = parse_patch(SINE_1K).unwrap();
    let synth = spawn_synth(patch, SynthSettings::default(), || {
        Err::<MemorySink, _>(Error::NoDevice)
    })
    .unwrap();
    assert!(synth.wait_running().is_none());
    synth.liveness().wait_stopped();
    assert!(matches!(synth.join(), Err(Error::NoDevice)));
}

#[test]
fn offline_render_to_wav() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sine.wav");
    let patch = parse_patch(SINE_1K).unwrap();
    let mut sink = WavSink::create(&path, 100);

    let stats = render_offline(&patch, 8000, 750, &mut sink).unwrap();
    assert_eq!(stats.samples, 800);

    let (samples, rate) = read_wav_i16(&path).unwrap();
    assert_eq!(rate, 8000);
    assert_eq!(samples.len(), 800);
    // 1 kHz at 8 kHz: eight samples per cycle, the sine output spans [0, 1]
    assert!((samples[0] - 16384).abs() <= 1);
    assert!(samples[2] >= 32765);
    assert!(samples[6] <= 2);
}
