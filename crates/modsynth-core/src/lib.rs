//! modsynth core - module graph engine for a software modular synthesizer
//!
//! This crate holds everything that runs once per sample: the node kinds, the
//! feed-forward graph that evaluates them in index order, and the contract the
//! graph uses to hand finished periods to an audio device.
//!
//! # Core Abstractions
//!
//! ## Graph
//!
//! - [`Graph`] - Ordered, fully wired node list with a per-sample [`Graph::tick()`]
//! - [`GraphBuilder`] - Two-phase construction (allocate, then wire) with validation
//! - [`NodeId`], [`PortRef`] - Index-based addressing of nodes and output slots
//!
//! ## Nodes
//!
//! - [`NodeKind`] - Constant, Oscillator, VCA, VCF, Adder, Crossfader, OutputSink
//! - [`Constant`] - Externally adjustable scalar backed by a [`SharedValue`]
//!
//! ## Control
//!
//! - [`ControlPanel`] - Thread-safe view of a graph's constants for a control surface
//! - [`ControlCategory`] - `HFO` / `LFO` / `PER` / `NDS` knob mapping and display
//!
//! ## Output
//!
//! - [`AudioSink`] - Object-safe destination for 16-bit periods
//! - [`quantize`] - Clamp-and-round conversion to `i16`
//!
//! # no_std Support
//!
//! The crate is `no_std` + `alloc` compatible. Disable the default `std`
//! feature:
//!
//! ```toml
//! [dependencies]
//! modsynth-core = { version = "0.1", default-features = false }
//! ```
//!
//! Enable the `tracing` feature to log underruns and graph construction.
//!
//! # Example
//!
//! ```rust
//! use modsynth_core::{AudioSink, GraphBuilder, NodeId, NodeKind, PortRef, SinkConfig, SinkError, WriteStatus};
//! use modsynth_core::{Constant, ControlCategory};
//!
//! struct Silent;
//! impl AudioSink for Silent {
//!     fn configure(&mut self, sample_rate: u32) -> Result<SinkConfig, SinkError> {
//!         Ok(SinkConfig { sample_rate, period_size: 64 })
//!     }
//!     fn write(&mut self, _: &[i16]) -> Result<WriteStatus, SinkError> { Ok(WriteStatus::Written) }
//!     fn prepare(&mut self) -> Result<(), SinkError> { Ok(()) }
//!     fn drain_and_close(&mut self) -> Result<(), SinkError> { Ok(()) }
//! }
//!
//! let mut b = GraphBuilder::new(3, 48000, 64).unwrap();
//! b.allocate_constant(NodeId::new(0), Constant::new(440.0, ControlCategory::Hfo, "pitch")).unwrap();
//! b.allocate(NodeId::new(1), NodeKind::Oscillator).unwrap();
//! b.wire(NodeId::new(1), 0, PortRef::new(NodeId::new(0), 0)).unwrap();
//! b.allocate(NodeId::new(2), NodeKind::OutputSink).unwrap();
//! b.wire(NodeId::new(2), 0, PortRef::new(NodeId::new(1), 0)).unwrap();
//! let mut graph = b.build().unwrap();
//!
//! let panel = graph.control_panel();
//! panel.set_value(0, 880.0).unwrap();
//! for _ in 0..256 {
//!     graph.tick(&mut Silent).unwrap();
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod control;
pub mod graph;
pub mod node;
pub mod sink;
pub mod value;

pub use control::{ControlCategory, ControlError, ControlPanel, DisplayValue};
pub use graph::{Graph, GraphBuilder, GraphError};
pub use node::{Constant, Node, NodeId, NodeKind, NodeState, PortRef, ports};
pub use sink::{AudioSink, I16_FULL_SCALE, SinkConfig, SinkError, WriteStatus, quantize};
pub use value::SharedValue;
