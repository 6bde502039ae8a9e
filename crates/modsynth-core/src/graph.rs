//! Feed-forward module graph evaluated once per sample.
//!
//! A [`Graph`] owns every [`Node`] in a flat `Vec`. Inputs are `(node, slot)`
//! index pairs, never pointers, and each input must name a node with a
//! strictly smaller index. Evaluating nodes in index order therefore yields a
//! causally correct sample without any run-time topological sort: when node
//! `i` runs, every node it reads has already produced this tick's output.
//!
//! Construction is two-phase through [`GraphBuilder`]:
//!
//! 1. [`allocate()`](GraphBuilder::allocate) a node of a given kind at an index
//! 2. [`wire()`](GraphBuilder::wire) each of its input slots to an upstream port
//!
//! [`build()`](GraphBuilder::build) checks that every index is allocated, every
//! input is wired, and every reference is backward and in range. The resulting
//! graph never changes shape.
//!
//! # Example
//!
//! ```rust
//! use modsynth_core::{ControlCategory, Graph, GraphBuilder, NodeId, NodeKind, PortRef};
//! use modsynth_core::node::{Constant, ports};
//!
//! let mut builder = GraphBuilder::new(3, 8000, 64)?;
//! builder.allocate_constant(NodeId::new(0), Constant::new(440.0, ControlCategory::Hfo, "freq"))?;
//! builder.allocate(NodeId::new(1), NodeKind::Oscillator)?;
//! builder.wire(NodeId::new(1), ports::oscillator::FREQUENCY, PortRef::new(NodeId::new(0), 0))?;
//! builder.allocate(NodeId::new(2), NodeKind::OutputSink)?;
//! builder.wire(NodeId::new(2), ports::output::SIGNAL, PortRef::new(NodeId::new(1), ports::oscillator::SINE))?;
//! let graph: Graph = builder.build()?;
//! assert_eq!(graph.len(), 3);
//! # Ok::<(), modsynth_core::GraphError>(())
//! ```

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::control::ControlPanel;
use crate::node::{Constant, MAX_INPUTS, Node, NodeId, NodeKind, NodeState, PortRef};
use crate::sink::{AudioSink, SinkError};

/// Errors raised while building or addressing a graph.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// Sample rate of zero.
    InvalidSampleRate,
    /// Period size of zero.
    InvalidPeriodSize,
    /// Index at or beyond the declared node count.
    IndexOutOfRange {
        /// Offending index.
        index: usize,
        /// Declared node count.
        count: usize,
    },
    /// The index was allocated twice.
    DuplicateNode(NodeId),
    /// No node was allocated at this index.
    MissingNode(NodeId),
    /// The node kind has no input slot with this number.
    InputSlotOutOfRange {
        /// Node being wired.
        node: NodeId,
        /// Its kind.
        kind: NodeKind,
        /// Requested input slot.
        slot: usize,
    },
    /// The referenced node has no output slot with this number.
    OutputSlotOutOfRange {
        /// Node whose input is being wired.
        node: NodeId,
        /// Referenced port.
        source: PortRef,
        /// Kind of the referenced node.
        source_kind: NodeKind,
    },
    /// An input refers to a node at the same or a later index.
    ForwardReference {
        /// Node whose input is being wired.
        node: NodeId,
        /// Referenced port.
        source: PortRef,
    },
    /// An input slot was never wired.
    UnwiredInput {
        /// Node with the dangling input.
        node: NodeId,
        /// Input slot.
        slot: usize,
    },
    /// The node is not a Constant.
    NotAConstant(NodeId),
    /// A constant was given a NaN or infinite value.
    NonFiniteValue {
        /// Constant being set.
        node: NodeId,
        /// Rejected value.
        value: f32,
    },
}

impl core::fmt::Display for GraphError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidSampleRate => write!(f, "sample rate must be non-zero"),
            Self::InvalidPeriodSize => write!(f, "period size must be non-zero"),
            Self::IndexOutOfRange { index, count } => {
                write!(f, "node index {index} outside declared range 0..{count}")
            }
            Self::DuplicateNode(id) => write!(f, "node {id} declared twice"),
            Self::MissingNode(id) => write!(f, "node {id} never declared"),
            Self::InputSlotOutOfRange { node, kind, slot } => {
                write!(f, "node {node} ({kind}) has no input slot {slot}")
            }
            Self::OutputSlotOutOfRange {
                node,
                source,
                source_kind,
            } => write!(
                f,
                "node {node} reads {source}, but {source_kind} has {} output(s)",
                source_kind.output_count()
            ),
            Self::ForwardReference { node, source } => write!(
                f,
                "node {node} reads {source}, which is not an earlier node"
            ),
            Self::UnwiredInput { node, slot } => {
                write!(f, "node {node} input slot {slot} is not connected")
            }
            Self::NotAConstant(id) => write!(f, "node {id} is not a constant"),
            Self::NonFiniteValue { node, value } => {
                write!(f, "node {node} cannot hold non-finite value {value}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GraphError {}

struct PendingNode {
    state: NodeState,
    inputs: Vec<Option<PortRef>>,
}

/// Two-phase constructor for a [`Graph`].
pub struct GraphBuilder {
    slots: Vec<Option<PendingNode>>,
    sample_rate: u32,
    period_size: usize,
}

impl GraphBuilder {
    /// Starts a graph of exactly `node_count` nodes.
    ///
    /// `period_size` sizes the OutputSink accumulators.
    pub fn new(node_count: usize, sample_rate: u32, period_size: usize) -> Result<Self, GraphError> {
        if sample_rate == 0 {
            return Err(GraphError::InvalidSampleRate);
        }
        if period_size == 0 {
            return Err(GraphError::InvalidPeriodSize);
        }
        let mut slots = Vec::with_capacity(node_count);
        slots.resize_with(node_count, || None);
        Ok(Self {
            slots,
            sample_rate,
            period_size,
        })
    }

    /// Declared node count.
    pub fn node_count(&self) -> usize {
        self.slots.len()
    }

    /// Allocates a node of `kind` at `id` with fresh kind-specific state.
    pub fn allocate(&mut self, id: NodeId, kind: NodeKind) -> Result<(), GraphError> {
        let state = NodeState::for_kind(kind, self.sample_rate, self.period_size);
        self.insert(id, state)
    }

    /// Allocates a Constant node at `id`.
    pub fn allocate_constant(&mut self, id: NodeId, constant: Constant) -> Result<(), GraphError> {
        self.insert(id, NodeState::Constant(constant))
    }

    /// Connects input `slot` of node `id` to `source`.
    ///
    /// `source` must name a node with a smaller index.
    pub fn wire(&mut self, id: NodeId, slot: usize, source: PortRef) -> Result<(), GraphError> {
        let count = self.slots.len();
        let pending = self
            .slots
            .get_mut(id.index())
            .ok_or(GraphError::IndexOutOfRange {
                index: id.index(),
                count,
            })?
            .as_mut()
            .ok_or(GraphError::MissingNode(id))?;

        let kind = pending.state.kind();
        let input = pending
            .inputs
            .get_mut(slot)
            .ok_or(GraphError::InputSlotOutOfRange {
                node: id,
                kind,
                slot,
            })?;
        if source.node >= id {
            return Err(GraphError::ForwardReference { node: id, source });
        }
        *input = Some(source);
        Ok(())
    }

    /// Validates the wiring and produces the graph.
    pub fn build(self) -> Result<Graph, GraphError> {
        let mut kinds = Vec::with_capacity(self.slots.len());
        let mut nodes = Vec::with_capacity(self.slots.len());

        for (index, slot) in self.slots.into_iter().enumerate() {
            let id = NodeId::new(index);
            let pending = slot.ok_or(GraphError::MissingNode(id))?;

            let mut inputs = Vec::with_capacity(pending.inputs.len());
            for (slot, input) in pending.inputs.into_iter().enumerate() {
                let source = input.ok_or(GraphError::UnwiredInput { node: id, slot })?;
                if source.node >= id {
                    return Err(GraphError::ForwardReference { node: id, source });
                }
                let source_kind: NodeKind = kinds[source.node.index()];
                if source.slot >= source_kind.output_count() {
                    return Err(GraphError::OutputSlotOutOfRange {
                        node: id,
                        source,
                        source_kind,
                    });
                }
                inputs.push(source);
            }

            kinds.push(pending.state.kind());
            nodes.push(Node::new(pending.state, inputs));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            nodes = nodes.len(),
            sample_rate = self.sample_rate,
            period_size = self.period_size,
            "graph built"
        );

        Ok(Graph {
            nodes,
            sample_rate: self.sample_rate,
            period_size: self.period_size,
            ticks: 0,
        })
    }

    fn insert(&mut self, id: NodeId, state: NodeState) -> Result<(), GraphError> {
        let count = self.slots.len();
        let slot = self
            .slots
            .get_mut(id.index())
            .ok_or(GraphError::IndexOutOfRange {
                index: id.index(),
                count,
            })?;
        if slot.is_some() {
            return Err(GraphError::DuplicateNode(id));
        }
        let inputs = vec![None; state.kind().input_count()];
        *slot = Some(PendingNode { state, inputs });
        Ok(())
    }
}

/// An ordered, fully wired collection of nodes.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    sample_rate: u32,
    period_size: usize,
    ticks: u64,
}

impl Graph {
    /// Evaluates every node once, in index order.
    ///
    /// OutputSink nodes write to `sink` whenever their period fills up. A sink
    /// error aborts the tick; nodes after the failing one keep last tick's
    /// outputs.
    pub fn tick<S: AudioSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), SinkError> {
        for i in 0..self.nodes.len() {
            let (upstream, rest) = self.nodes.split_at_mut(i);
            let node = &mut rest[0];

            let mut values = [0.0f32; MAX_INPUTS];
            for (value, port) in values.iter_mut().zip(node.inputs()) {
                *value = upstream[port.node.index()].outputs()[port.slot];
            }
            let arity = node.inputs().len();
            node.tick(&values[..arity], sink)?;
        }
        self.ticks += 1;
        Ok(())
    }

    /// The value currently seen by input `slot` of node `id`.
    ///
    /// Between ticks this is the referenced node's output from the last tick.
    pub fn input_value(&self, id: NodeId, slot: usize) -> Option<f32> {
        let port = self.node(id)?.inputs().get(slot)?;
        self.node(port.node)?.output(port.slot)
    }

    /// Node at `id`.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// All nodes in evaluation order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Sample rate the graph was built for.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Period size of the OutputSink accumulators.
    pub fn period_size(&self) -> usize {
        self.period_size
    }

    /// Number of completed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Constant state of node `id`.
    pub fn constant(&self, id: NodeId) -> Result<&Constant, GraphError> {
        self.node(id)
            .ok_or(GraphError::MissingNode(id))?
            .constant()
            .ok_or(GraphError::NotAConstant(id))
    }

    /// Sets the current value of constant `id`.
    pub fn set_value(&self, id: NodeId, value: f32) -> Result<(), GraphError> {
        let constant = self.constant(id)?;
        if !value.is_finite() {
            return Err(GraphError::NonFiniteValue { node: id, value });
        }
        constant.set_value(value);
        Ok(())
    }

    /// Replaces the initial value of constant `id` and resets it.
    ///
    /// Control panels created earlier keep reporting the old initial value.
    pub fn set_initial_value(&mut self, id: NodeId, value: f32) -> Result<(), GraphError> {
        if !value.is_finite() {
            return Err(GraphError::NonFiniteValue { node: id, value });
        }
        self.nodes
            .get_mut(id.index())
            .ok_or(GraphError::MissingNode(id))?
            .constant_mut()
            .ok_or(GraphError::NotAConstant(id))?
            .set_initial_value(value);
        Ok(())
    }

    /// Returns every node to its just-loaded state: phases and filter history
    /// zeroed, output accumulators emptied, constants at their initial values.
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.reset();
        }
        self.ticks = 0;
    }

    /// Creates a control-surface view sharing this graph's constants.
    pub fn control_panel(&self) -> ControlPanel {
        ControlPanel::from_nodes(self.nodes.iter().map(|n| (n.kind(), n.constant())))
    }

    /// IDs of all OutputSink nodes.
    pub fn output_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.kind() == NodeKind::OutputSink)
            .map(|(i, _)| NodeId::new(i))
    }
}
