//! Node model: kinds, ports, per-kind state and per-sample update rules.
//!
//! Every node is a closed variant dispatched by `match`. A node reads its input
//! values (already resolved by the [`Graph`](crate::Graph) from upstream
//! outputs), updates its private state, and publishes new output values for
//! downstream nodes to read during the same tick.
//!
//! | Kind | Code | Inputs | Outputs |
//! |------|------|--------|---------|
//! | Constant | `CST` | – | value |
//! | Oscillator | `OCC` | frequency | sine, triangle, saw, square |
//! | VCA | `VCA` | control, signal | signal |
//! | VCF | `VCF` | cutoff, resonance, signal | signal |
//! | Adder | `ADD` | a, b | sum |
//! | Crossfader | `FAD` | a, b, mix | signal |
//! | OutputSink | `OUT` | signal | – |

#[cfg(not(feature = "std"))]
use alloc::{string::String, vec, vec::Vec};

use core::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::control::ControlCategory;
use crate::sink::{AudioSink, SinkError, WriteStatus, quantize_block};
use crate::value::SharedValue;

/// Largest input count of any node kind.
pub const MAX_INPUTS: usize = 3;

/// Largest output count of any node kind.
pub const MAX_OUTPUTS: usize = 4;

/// Number of cascaded one-pole stages in the VCF.
pub const FILTER_STAGES: usize = 4;

/// Port indices, grouped by node kind.
pub mod ports {
    /// Constant node ports.
    pub mod constant {
        /// Output: the current value.
        pub const VALUE: usize = 0;
    }

    /// Oscillator node ports.
    pub mod oscillator {
        /// Input: frequency in Hz.
        pub const FREQUENCY: usize = 0;
        /// Output: `0.5 + 0.5·sin(phase)`.
        pub const SINE: usize = 0;
        /// Output: triangle in `[0, 1]`.
        pub const TRIANGLE: usize = 1;
        /// Output: `phase / 2π`.
        pub const SAW: usize = 2;
        /// Output: 1 for `phase ∈ [π/2, 3π/2)`, else 0.
        pub const SQUARE: usize = 3;
    }

    /// VCA node ports.
    pub mod vca {
        /// Input: control voltage (gain).
        pub const CONTROL: usize = 0;
        /// Input: signal.
        pub const SIGNAL: usize = 1;
        /// Output: `control × signal`.
        pub const OUT: usize = 0;
    }

    /// VCF node ports.
    pub mod filter {
        /// Input: cutoff, roughly `[0, 1]`.
        pub const CUTOFF: usize = 0;
        /// Input: resonance feedback amount.
        pub const RESONANCE: usize = 1;
        /// Input: signal.
        pub const SIGNAL: usize = 2;
        /// Output: last stage.
        pub const OUT: usize = 0;
    }

    /// Adder node ports.
    pub mod adder {
        /// Input: first operand.
        pub const A: usize = 0;
        /// Input: second operand.
        pub const B: usize = 1;
        /// Output: `a + b`.
        pub const SUM: usize = 0;
    }

    /// Crossfader node ports.
    pub mod crossfader {
        /// Input: signal heard at `mix = 0`.
        pub const A: usize = 0;
        /// Input: signal heard at `mix = 1`.
        pub const B: usize = 1;
        /// Input: mix position in `[0, 1]`.
        pub const MIX: usize = 2;
        /// Output: `a·(1-mix) + b·mix`.
        pub const OUT: usize = 0;
    }

    /// OutputSink node ports.
    pub mod output {
        /// Input: signal in nominal `[-1, 1]`.
        pub const SIGNAL: usize = 0;
    }
}

/// Identifier of a node: its position in the graph's evaluation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Creates a node ID from a graph index.
    ///
    /// Indices beyond `u32::MAX` saturate; they can never name a real node.
    #[inline]
    pub fn new(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }

    /// Returns the graph index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reference to one output slot of an upstream node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PortRef {
    /// Upstream node.
    pub node: NodeId,
    /// Output slot on that node.
    pub slot: usize,
}

impl PortRef {
    /// Creates a port reference.
    pub fn new(node: NodeId, slot: usize) -> Self {
        Self { node, slot }
    }
}

impl core::fmt::Display for PortRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.node.0, self.slot)
    }
}

/// The kind of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Externally adjustable scalar.
    Constant,
    /// Four-waveform phase oscillator.
    Oscillator,
    /// Voltage-controlled amplifier.
    Vca,
    /// Four-stage resonant lowpass (voltage-controlled filter).
    Filter,
    /// Sum of two signals.
    Adder,
    /// Linear blend between two signals.
    Crossfader,
    /// Terminal node feeding the audio device.
    OutputSink,
}

impl NodeKind {
    /// All node kinds, in patch-code order.
    pub const ALL: [NodeKind; 7] = [
        NodeKind::Constant,
        NodeKind::Adder,
        NodeKind::Crossfader,
        NodeKind::Oscillator,
        NodeKind::Vca,
        NodeKind::Filter,
        NodeKind::OutputSink,
    ];

    /// Three-letter code used in patch files.
    pub fn code(self) -> &'static str {
        match self {
            Self::Constant => "CST",
            Self::Oscillator => "OCC",
            Self::Vca => "VCA",
            Self::Filter => "VCF",
            Self::Adder => "ADD",
            Self::Crossfader => "FAD",
            Self::OutputSink => "OUT",
        }
    }

    /// Looks up a kind by its patch code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.code() == code)
    }

    /// Number of input slots.
    pub fn input_count(self) -> usize {
        self.input_names().len()
    }

    /// Number of output slots.
    pub fn output_count(self) -> usize {
        self.output_names().len()
    }

    /// Input slot names, in slot order.
    pub fn input_names(self) -> &'static [&'static str] {
        match self {
            Self::Constant => &[],
            Self::Oscillator => &["frequency"],
            Self::Vca => &["control", "signal"],
            Self::Filter => &["cutoff", "resonance", "signal"],
            Self::Adder => &["a", "b"],
            Self::Crossfader => &["a", "b", "mix"],
            Self::OutputSink => &["signal"],
        }
    }

    /// Output slot names, in slot order.
    pub fn output_names(self) -> &'static [&'static str] {
        match self {
            Self::Constant => &["value"],
            Self::Oscillator => &["sine", "triangle", "saw", "square"],
            Self::Vca | Self::Filter | Self::Crossfader => &["signal"],
            Self::Adder => &["sum"],
            Self::OutputSink => &[],
        }
    }
}

impl core::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

/// State of a Constant node.
///
/// The current value lives in a [`SharedValue`] so a controller on another
/// thread can change it while the graph runs.
#[derive(Debug, Clone)]
pub struct Constant {
    value: SharedValue,
    initial: f32,
    category: ControlCategory,
    label: String,
}

impl Constant {
    /// Creates a constant whose current value starts at `initial`.
    pub fn new(initial: f32, category: ControlCategory, label: impl Into<String>) -> Self {
        Self {
            value: SharedValue::new(initial),
            initial,
            category,
            label: label.into(),
        }
    }

    /// Current value.
    pub fn value(&self) -> f32 {
        self.value.get()
    }

    /// Changes the current value. The initial value is untouched.
    pub fn set_value(&self, value: f32) {
        self.value.set(value);
    }

    /// Value the constant was loaded with.
    pub fn initial_value(&self) -> f32 {
        self.initial
    }

    /// Replaces the initial value and resets the current value to it.
    pub fn set_initial_value(&mut self, value: f32) {
        self.initial = value;
        self.value.set(value);
    }

    /// UI category.
    pub fn category(&self) -> ControlCategory {
        self.category
    }

    /// Display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Handle to the shared storage of the current value.
    pub fn shared(&self) -> SharedValue {
        self.value.clone()
    }
}

/// Phase accumulator behind the Oscillator node.
///
/// Phase is accumulated in `f64`; only the published waveforms are `f32`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorState {
    /// Phase in radians, kept in `[0, 2π)`.
    phase: f64,
    /// Radians per Hz per sample: `2π / sample_rate`.
    phase_per_hz: f64,
}

impl OscillatorState {
    /// Creates an oscillator at phase zero.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            phase: 0.0,
            phase_per_hz: TAU / f64::from(sample_rate),
        }
    }

    /// Current phase in radians.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Writes the four waveforms for the current phase, then advances the
    /// phase by `2π·frequency/sample_rate`.
    ///
    /// The wrap adds or subtracts `2π` once, so the frequency must stay below
    /// the sample rate.
    pub fn tick(&mut self, frequency: f32, out: &mut [f32; MAX_OUTPUTS]) {
        let phase = self.phase;
        out[ports::oscillator::SINE] = (0.5 + 0.5 * libm::sin(phase)) as f32;
        out[ports::oscillator::TRIANGLE] = triangle(phase) as f32;
        out[ports::oscillator::SAW] = (phase / TAU) as f32;
        out[ports::oscillator::SQUARE] = if (FRAC_PI_2..3.0 * FRAC_PI_2).contains(&phase) {
            1.0
        } else {
            0.0
        };

        let mut next = phase + self.phase_per_hz * f64::from(frequency);
        if next >= TAU {
            next -= TAU;
        } else if next < 0.0 {
            next += TAU;
        }
        // rounding can land exactly on 2π after a negative wrap
        if next >= TAU {
            next = 0.0;
        }
        self.phase = next;
    }

    fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// Triangle aligned with the sine output: 0.5 at phase 0, 1 at π/2,
/// 0 at 3π/2.
fn triangle(phase: f64) -> f64 {
    if phase < FRAC_PI_2 {
        0.5 + 0.5 * phase / FRAC_PI_2
    } else if phase < 3.0 * FRAC_PI_2 {
        1.0 - (phase - FRAC_PI_2) / PI
    } else {
        0.5 * (phase - 3.0 * FRAC_PI_2) / FRAC_PI_2
    }
}

/// Stage history of the four-pole VCF.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterState {
    /// Stage outputs after the latest tick, `s(n)`.
    sn: [f32; FILTER_STAGES],
    /// Stage outputs one tick earlier, `s(n-1)`.
    snm1: [f32; FILTER_STAGES],
}

impl FilterState {
    /// Runs one sample through the cascade and returns the output tap.
    ///
    /// History is rotated first (`s(n-1) ← s(n)`), then every stage is
    /// recomputed from the rotated values:
    ///
    /// ```text
    /// s[i](n) = s[i-1](n-1)·cutoff + s[i](n-1)·(1-cutoff)          i = 3..1
    /// s[0](n) = signal·cutoff + s[0](n-1)·(1-cutoff) + s[3](n-1)·resonance
    /// ```
    ///
    /// The output tap is `s[3](n-1)`, the same value fed back for resonance.
    /// This is one sample behind the freshly computed `s[3](n)`; tapping
    /// `s[3](n)` would make the open filter a three-sample delay. With
    /// `cutoff = 1` and `resonance = 0` the filter is a pure four-sample
    /// delay; with `cutoff = 0` it holds its state.
    pub fn tick(&mut self, cutoff: f32, resonance: f32, signal: f32) -> f32 {
        self.snm1 = self.sn;
        let prev = &self.snm1;
        let hold = 1.0 - cutoff;
        for i in (1..FILTER_STAGES).rev() {
            self.sn[i] = prev[i - 1] * cutoff + prev[i] * hold;
        }
        self.sn[0] = signal * cutoff + prev[0] * hold + prev[FILTER_STAGES - 1] * resonance;
        prev[FILTER_STAGES - 1]
    }

    /// Stage outputs after the latest tick.
    pub fn stages(&self) -> &[f32; FILTER_STAGES] {
        &self.sn
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Sample accumulator behind the OutputSink node.
#[derive(Debug, Clone)]
pub struct OutputBuffer {
    samples: Vec<f32>,
    block: Vec<i16>,
    fill: usize,
    periods: u64,
    underruns: u64,
}

impl OutputBuffer {
    /// Creates an empty accumulator for periods of `period_size` samples.
    pub fn new(period_size: usize) -> Self {
        Self {
            samples: vec![0.0; period_size],
            block: vec![0; period_size],
            fill: 0,
            periods: 0,
            underruns: 0,
        }
    }

    /// Number of samples buffered since the last write.
    pub fn fill(&self) -> usize {
        self.fill
    }

    /// Period size in samples.
    pub fn period_size(&self) -> usize {
        self.samples.len()
    }

    /// Number of periods handed to the sink.
    pub fn periods_written(&self) -> u64 {
        self.periods
    }

    /// Number of writes the sink reported as underruns.
    pub fn underruns(&self) -> u64 {
        self.underruns
    }

    /// Appends one sample; on a full period, quantizes and writes it.
    pub fn push<S: AudioSink + ?Sized>(
        &mut self,
        sample: f32,
        sink: &mut S,
    ) -> Result<(), SinkError> {
        self.samples[self.fill] = sample;
        self.fill += 1;
        if self.fill < self.samples.len() {
            return Ok(());
        }

        self.fill = 0;
        quantize_block(&self.samples, &mut self.block);
        self.periods += 1;
        if sink.write(&self.block)? == WriteStatus::Underrun {
            self.underruns += 1;
            #[cfg(feature = "tracing")]
            tracing::warn!(
                period = self.periods,
                underruns = self.underruns,
                "output underrun, re-preparing sink"
            );
            sink.prepare()?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.fill = 0;
    }
}

/// Kind-specific node state.
#[derive(Debug, Clone)]
pub enum NodeState {
    /// Constant node.
    Constant(Constant),
    /// Oscillator node.
    Oscillator(OscillatorState),
    /// VCA node (stateless).
    Vca,
    /// VCF node.
    Filter(FilterState),
    /// Adder node (stateless).
    Adder,
    /// Crossfader node (stateless).
    Crossfader,
    /// OutputSink node.
    OutputSink(OutputBuffer),
}

impl NodeState {
    /// Creates fresh state for `kind`.
    ///
    /// Constants start at 0 with category `NDS` and an empty label; use
    /// [`NodeState::Constant`] directly to give them a value.
    pub fn for_kind(kind: NodeKind, sample_rate: u32, period_size: usize) -> Self {
        match kind {
            NodeKind::Constant => Self::Constant(Constant::new(0.0, ControlCategory::Nds, "")),
            NodeKind::Oscillator => Self::Oscillator(OscillatorState::new(sample_rate)),
            NodeKind::Vca => Self::Vca,
            NodeKind::Filter => Self::Filter(FilterState::default()),
            NodeKind::Adder => Self::Adder,
            NodeKind::Crossfader => Self::Crossfader,
            NodeKind::OutputSink => Self::OutputSink(OutputBuffer::new(period_size)),
        }
    }

    /// The kind this state belongs to.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Constant(_) => NodeKind::Constant,
            Self::Oscillator(_) => NodeKind::Oscillator,
            Self::Vca => NodeKind::Vca,
            Self::Filter(_) => NodeKind::Filter,
            Self::Adder => NodeKind::Adder,
            Self::Crossfader => NodeKind::Crossfader,
            Self::OutputSink(_) => NodeKind::OutputSink,
        }
    }
}

/// One wired node of a [`Graph`](crate::Graph).
#[derive(Debug, Clone)]
pub struct Node {
    state: NodeState,
    inputs: Vec<PortRef>,
    outputs: [f32; MAX_OUTPUTS],
}

impl Node {
    pub(crate) fn new(state: NodeState, inputs: Vec<PortRef>) -> Self {
        debug_assert_eq!(inputs.len(), state.kind().input_count());
        Self {
            state,
            inputs,
            outputs: [0.0; MAX_OUTPUTS],
        }
    }

    /// Node kind.
    pub fn kind(&self) -> NodeKind {
        self.state.kind()
    }

    /// Input wiring, in slot order.
    pub fn inputs(&self) -> &[PortRef] {
        &self.inputs
    }

    /// Output values produced by the last tick.
    pub fn outputs(&self) -> &[f32] {
        &self.outputs[..self.kind().output_count()]
    }

    /// A single output value.
    pub fn output(&self, slot: usize) -> Option<f32> {
        self.outputs().get(slot).copied()
    }

    /// Kind-specific state.
    pub fn state(&self) -> &NodeState {
        &self.state
    }

    /// Constant state, if this is a Constant node.
    pub fn constant(&self) -> Option<&Constant> {
        match &self.state {
            NodeState::Constant(c) => Some(c),
            _ => None,
        }
    }

    pub(crate) fn constant_mut(&mut self) -> Option<&mut Constant> {
        match &mut self.state {
            NodeState::Constant(c) => Some(c),
            _ => None,
        }
    }

    /// Output accumulator, if this is an OutputSink node.
    pub fn output_buffer(&self) -> Option<&OutputBuffer> {
        match &self.state {
            NodeState::OutputSink(buf) => Some(buf),
            _ => None,
        }
    }

    /// Advances the node by one sample.
    ///
    /// `inputs` holds the resolved value of each input slot.
    pub(crate) fn tick<S: AudioSink + ?Sized>(
        &mut self,
        inputs: &[f32],
        sink: &mut S,
    ) -> Result<(), SinkError> {
        let out = &mut self.outputs;
        match &mut self.state {
            NodeState::Constant(c) => out[ports::constant::VALUE] = c.value(),
            NodeState::Oscillator(osc) => osc.tick(inputs[ports::oscillator::FREQUENCY], out),
            NodeState::Vca => {
                out[ports::vca::OUT] = inputs[ports::vca::CONTROL] * inputs[ports::vca::SIGNAL];
            }
            NodeState::Filter(filter) => {
                out[ports::filter::OUT] = filter.tick(
                    inputs[ports::filter::CUTOFF],
                    inputs[ports::filter::RESONANCE],
                    inputs[ports::filter::SIGNAL],
                );
            }
            NodeState::Adder => {
                out[ports::adder::SUM] = inputs[ports::adder::A] + inputs[ports::adder::B];
            }
            NodeState::Crossfader => {
                let mix = inputs[ports::crossfader::MIX];
                out[ports::crossfader::OUT] =
                    inputs[ports::crossfader::A] * (1.0 - mix) + inputs[ports::crossfader::B] * mix;
            }
            NodeState::OutputSink(buf) => buf.push(inputs[ports::output::SIGNAL], sink)?,
        }
        Ok(())
    }

    /// Returns the node to its just-loaded state.
    pub(crate) fn reset(&mut self) {
        self.outputs = [0.0; MAX_OUTPUTS];
        match &mut self.state {
            NodeState::Constant(c) => c.set_value(c.initial_value()),
            NodeState::Oscillator(osc) => osc.reset(),
            NodeState::Filter(filter) => filter.reset(),
            NodeState::OutputSink(buf) => buf.reset(),
            NodeState::Vca | NodeState::Adder | NodeState::Crossfader => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    #[test]
    fn kind_codes_round_trip() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(NodeKind::from_code("XYZ"), None);
        assert_eq!(NodeKind::from_code("cst"), None);
    }

    #[test]
    fn port_counts() {
        assert_eq!(NodeKind::Constant.input_count(), 0);
        assert_eq!(NodeKind::Constant.output_count(), 1);
        assert_eq!(NodeKind::Oscillator.output_count(), 4);
        assert_eq!(NodeKind::Filter.input_count(), 3);
        assert_eq!(NodeKind::Crossfader.input_count(), 3);
        assert_eq!(NodeKind::OutputSink.output_count(), 0);
        for kind in NodeKind::ALL {
            assert!(kind.input_count() <= MAX_INPUTS);
            assert!(kind.output_count() <= MAX_OUTPUTS);
        }
    }

    #[test]
    fn oscillator_waveforms_at_phase_zero() {
        let mut osc = OscillatorState::new(48000);
        let mut out = [0.0; MAX_OUTPUTS];
        osc.tick(440.0, &mut out);
        assert!((out[ports::oscillator::SINE] - 0.5).abs() < EPS);
        assert!((out[ports::oscillator::TRIANGLE] - 0.5).abs() < EPS);
        assert_eq!(out[ports::oscillator::SAW], 0.0);
        assert_eq!(out[ports::oscillator::SQUARE], 0.0);
    }

    #[test]
    fn oscillator_advances_by_expected_increment() {
        let mut osc = OscillatorState::new(8000);
        let mut out = [0.0; MAX_OUTPUTS];
        osc.tick(1000.0, &mut out);
        assert!((osc.phase() - TAU / 8.0).abs() < 1e-12);
    }

    #[test]
    fn oscillator_quarter_points() {
        // 1 Hz at 4 samples/s steps exactly a quarter turn per tick
        let mut osc = OscillatorState::new(4);
        let mut out = [0.0; MAX_OUTPUTS];

        osc.tick(1.0, &mut out); // phase 0
        osc.tick(1.0, &mut out); // phase π/2
        assert!((out[ports::oscillator::SINE] - 1.0).abs() < EPS);
        assert!((out[ports::oscillator::TRIANGLE] - 1.0).abs() < EPS);
        assert!((out[ports::oscillator::SAW] - 0.25).abs() < EPS);
        assert_eq!(out[ports::oscillator::SQUARE], 1.0);

        osc.tick(1.0, &mut out); // phase π
        assert!((out[ports::oscillator::TRIANGLE] - 0.5).abs() < EPS);
        assert_eq!(out[ports::oscillator::SQUARE], 1.0);

        osc.tick(1.0, &mut out); // phase 3π/2
        assert!(out[ports::oscillator::SINE].abs() < EPS);
        assert!(out[ports::oscillator::TRIANGLE].abs() < EPS);
        assert_eq!(out[ports::oscillator::SQUARE], 0.0);
    }

    #[test]
    fn oscillator_wraps_into_range() {
        let mut osc = OscillatorState::new(100);
        let mut out = [0.0; MAX_OUTPUTS];
        for _ in 0..1000 {
            osc.tick(37.0, &mut out);
            assert!((0.0..TAU).contains(&osc.phase()));
        }
    }

    #[test]
    fn oscillator_negative_frequency_wraps_up() {
        let mut osc = OscillatorState::new(100);
        let mut out = [0.0; MAX_OUTPUTS];
        osc.tick(-10.0, &mut out);
        assert!((osc.phase() - (TAU - TAU / 10.0)).abs() < 1e-12);
    }

    #[test]
    fn filter_open_is_four_sample_delay() {
        let mut filter = FilterState::default();
        let signal = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let out: Vec<f32> = signal.iter().map(|&s| filter.tick(1.0, 0.0, s)).collect();
        assert_eq!(out, [0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn filter_closed_holds_output() {
        let mut filter = FilterState::default();
        for _ in 0..16 {
            filter.tick(0.5, 0.0, 1.0);
        }
        let held = filter.tick(0.0, 0.0, 1.0);
        for s in [-1.0, 0.0, 5.0, 100.0] {
            assert_eq!(filter.tick(0.0, 0.0, s), held);
        }
    }

    #[test]
    fn filter_resonance_feeds_back_last_stage() {
        let mut filter = FilterState::default();
        // impulse through an open filter reaches stage 3 after four ticks
        filter.tick(1.0, 0.0, 1.0);
        for _ in 0..3 {
            filter.tick(1.0, 0.0, 0.0);
        }
        assert_eq!(filter.stages()[3], 1.0);
        filter.tick(1.0, 0.5, 0.0);
        assert_eq!(filter.stages()[0], 0.5);
    }

    #[test]
    fn constant_initial_value_resets_current() {
        let mut c = Constant::new(1.0, ControlCategory::Lfo, "rate");
        c.set_value(3.0);
        assert_eq!(c.value(), 3.0);
        assert_eq!(c.initial_value(), 1.0);
        c.set_initial_value(2.0);
        assert_eq!(c.value(), 2.0);
        assert_eq!(c.initial_value(), 2.0);
    }

    #[test]
    fn node_id_display_and_index() {
        let id = NodeId::new(12);
        assert_eq!(id.index(), 12);
        assert_eq!(format!("{id}"), "#12");
        assert_eq!(format!("{}", PortRef::new(id, 3)), "12/3");
    }
}
