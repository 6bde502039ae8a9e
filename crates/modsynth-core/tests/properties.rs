//! Property-based tests for modsynth-core node behavior.
//!
//! Covers oscillator output ranges, crossfader end points, VCF hold and delay
//! behavior, and quantization bounds using proptest for randomized inputs.

use modsynth_core::node::{FilterState, MAX_OUTPUTS, OscillatorState};
use modsynth_core::{ControlCategory, quantize};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Every waveform stays in [0, 1] and the phase stays in [0, 2π) for any
    /// frequency below the sample rate.
    #[test]
    fn oscillator_outputs_in_unit_range(
        sample_rate in 1000u32..96000,
        ratio in -0.99f32..0.99,
        ticks in 1usize..2000,
    ) {
        let freq = ratio * sample_rate as f32;
        let mut osc = OscillatorState::new(sample_rate);
        let mut out = [0.0; MAX_OUTPUTS];
        for _ in 0..ticks {
            osc.tick(freq, &mut out);
            for (slot, &v) in out.iter().enumerate() {
                prop_assert!((-1e-6..=1.0 + 1e-6).contains(&v), "slot {} = {}", slot, v);
            }
            prop_assert!((0.0..core::f64::consts::TAU).contains(&osc.phase()));
        }
    }

    /// Square output is exactly 0 or 1.
    #[test]
    fn square_is_binary(freq in 1.0f32..5000.0, ticks in 1usize..500) {
        let mut osc = OscillatorState::new(44100);
        let mut out = [0.0; MAX_OUTPUTS];
        for _ in 0..ticks {
            osc.tick(freq, &mut out);
            prop_assert!(out[3] == 0.0 || out[3] == 1.0);
        }
    }

    /// With cutoff = 1 and resonance = 0 the VCF output is its input delayed
    /// by four samples.
    #[test]
    fn open_filter_delays_by_four(input in prop::collection::vec(-1.0f32..1.0, 5..64)) {
        let mut filter = FilterState::default();
        let out: Vec<f32> = input.iter().map(|&s| filter.tick(1.0, 0.0, s)).collect();
        prop_assert_eq!(&out[..4], &[0.0; 4][..]);
        prop_assert_eq!(&out[4..], &input[..input.len() - 4]);
    }

    /// With cutoff = 0 and resonance = 0 the VCF output never changes.
    #[test]
    fn closed_filter_holds(
        warmup in prop::collection::vec(-1.0f32..1.0, 4..32),
        input in prop::collection::vec(-10.0f32..10.0, 1..64),
    ) {
        let mut filter = FilterState::default();
        for &s in &warmup {
            filter.tick(0.7, 0.0, s);
        }
        let held = filter.tick(0.0, 0.0, 0.0);
        for &s in &input {
            prop_assert_eq!(filter.tick(0.0, 0.0, s), held);
        }
    }

    /// Quantization saturates instead of wrapping.
    #[test]
    fn quantize_is_monotonic_and_bounded(a in -4.0f32..4.0, b in -4.0f32..4.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(quantize(lo) <= quantize(hi));
        prop_assert!((-32767..=32767).contains(&quantize(a)));
    }

    /// Knob positions map into each category's range and back.
    #[test]
    fn knob_mapping_stays_in_range(p in -1.0f32..2.0) {
        for c in [ControlCategory::Hfo, ControlCategory::Lfo, ControlCategory::Per] {
            let v = c.from_knob(p);
            let back = c.to_knob(v);
            prop_assert!((0.0..=1.0).contains(&back));
            prop_assert!((back - p.clamp(0.0, 1.0)).abs() < 1e-3);
        }
    }
}
