//! Criterion benchmarks for per-sample graph evaluation.
//!
//! Two axes:
//!
//! - **Chain** - oscillator/VCA chains of increasing length into one OutputSink
//! - **Patch** - the 11-node default voice (two LFOs, VCA, VCF)
//!
//! Run with: `cargo bench -p modsynth-core -- graph/`
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use modsynth_core::{
    AudioSink, Constant, ControlCategory, Graph, GraphBuilder, NodeId, NodeKind, PortRef,
    SinkConfig, SinkError, WriteStatus, ports,
};

const SAMPLE_RATE: u32 = 48000;
const PERIOD: usize = 512;
const TICKS: usize = 4096;

/// Discards every block.
struct NullSink;

impl AudioSink for NullSink {
    fn configure(&mut self, sample_rate: u32) -> Result<SinkConfig, SinkError> {
        Ok(SinkConfig {
            sample_rate,
            period_size: PERIOD,
        })
    }

    fn write(&mut self, samples: &[i16]) -> Result<WriteStatus, SinkError> {
        black_box(samples);
        Ok(WriteStatus::Written)
    }

    fn prepare(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    fn drain_and_close(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

fn port(node: usize, slot: usize) -> PortRef {
    PortRef::new(NodeId::new(node), slot)
}

/// CST, OCC, then `stages` x (CST gain, VCA), then OUT.
fn chain_graph(stages: usize) -> Graph {
    let count = 2 + stages * 2 + 1;
    let mut b = GraphBuilder::new(count, SAMPLE_RATE, PERIOD).unwrap();
    b.allocate_constant(NodeId::new(0), Constant::new(440.0, ControlCategory::Hfo, "f"))
        .unwrap();
    b.allocate(NodeId::new(1), NodeKind::Oscillator).unwrap();
    b.wire(NodeId::new(1), 0, port(0, 0)).unwrap();

    let mut last = 1;
    for s in 0..stages {
        let gain = 2 + s * 2;
        let vca = gain + 1;
        b.allocate_constant(NodeId::new(gain), Constant::new(0.99, ControlCategory::Per, "g"))
            .unwrap();
        b.allocate(NodeId::new(vca), NodeKind::Vca).unwrap();
        b.wire(NodeId::new(vca), ports::vca::CONTROL, port(gain, 0))
            .unwrap();
        b.wire(NodeId::new(vca), ports::vca::SIGNAL, port(last, 0))
            .unwrap();
        last = vca;
    }
    b.allocate(NodeId::new(count - 1), NodeKind::OutputSink)
        .unwrap();
    b.wire(NodeId::new(count - 1), 0, port(last, 0)).unwrap();
    b.build().unwrap()
}

fn default_voice() -> Graph {
    let mut b = GraphBuilder::new(11, SAMPLE_RATE, PERIOD).unwrap();
    let cst = |b: &mut GraphBuilder, i: usize, v: f32, c: ControlCategory| {
        b.allocate_constant(NodeId::new(i), Constant::new(v, c, "")).unwrap();
    };
    cst(&mut b, 0, 440.0, ControlCategory::Hfo);
    b.allocate(NodeId::new(1), NodeKind::Oscillator).unwrap();
    b.wire(NodeId::new(1), 0, port(0, 0)).unwrap();
    cst(&mut b, 2, 10.0, ControlCategory::Lfo);
    b.allocate(NodeId::new(3), NodeKind::Oscillator).unwrap();
    b.wire(NodeId::new(3), 0, port(2, 0)).unwrap();
    b.allocate(NodeId::new(4), NodeKind::Vca).unwrap();
    b.wire(NodeId::new(4), 0, port(3, 0)).unwrap();
    b.wire(NodeId::new(4), 1, port(1, 0)).unwrap();
    cst(&mut b, 5, 1.0, ControlCategory::Lfo);
    b.allocate(NodeId::new(6), NodeKind::Oscillator).unwrap();
    b.wire(NodeId::new(6), 0, port(5, 0)).unwrap();
    cst(&mut b, 7, 0.25, ControlCategory::Per);
    cst(&mut b, 8, 0.0, ControlCategory::Per);
    b.allocate(NodeId::new(9), NodeKind::Filter).unwrap();
    b.wire(NodeId::new(9), 0, port(6, 0)).unwrap();
    b.wire(NodeId::new(9), 1, port(8, 0)).unwrap();
    b.wire(NodeId::new(9), 2, port(4, 0)).unwrap();
    b.allocate(NodeId::new(10), NodeKind::OutputSink).unwrap();
    b.wire(NodeId::new(10), 0, port(9, 0)).unwrap();
    b.build().unwrap()
}

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/chain");
    for stages in [1usize, 8, 32] {
        group.bench_with_input(BenchmarkId::from_parameter(stages), &stages, |bench, &n| {
            let mut graph = chain_graph(n);
            let mut sink = NullSink;
            bench.iter(|| {
                for _ in 0..TICKS {
                    graph.tick(&mut sink).unwrap();
                }
            });
        });
    }
    group.finish();
}

fn bench_default_voice(c: &mut Criterion) {
    c.bench_function("graph/default_voice", |bench| {
        let mut graph = default_voice();
        let mut sink = NullSink;
        bench.iter(|| {
            for _ in 0..TICKS {
                graph.tick(&mut sink).unwrap();
            }
        });
    });
}

criterion_group!(benches, bench_chain, bench_default_voice);
criterion_main!(benches);
