//! Patch text parser.
//!
//! ## Format
//!
//! One node per non-blank, newline-terminated line:
//!
//! ```text
//! record   ::= index KIND fields
//! fields   ::= value CATEGORY label          (KIND = CST)
//!            | ( node '/' slot )*            (one per input slot, in slot order)
//! KIND     ::= CST | ADD | FAD | OCC | VCA | VCF | OUT
//! CATEGORY ::= HFO | LFO | PER | NDS
//! ```
//!
//! Fields are separated by any run of whitespace. A constant's label is the
//! rest of the line after its category. At most one `OUT` record is allowed,
//! since every output sink writes into the same device.
//!
//! The node count comes from the leading index of the **last** non-blank line
//! plus one; the text is then scanned from the top. Every record's index must
//! equal its position, so the last line is always the highest-indexed node.
//!
//! Two-phase design: parse → [`PatchSpec`], then [`PatchSpec::build()`] →
//! [`Graph`]. Parsing already enforces every wiring rule, so building only
//! fails on a bad sample rate or period size.

use std::path::Path;

use modsynth_core::{
    Constant, ControlCategory, Graph, GraphBuilder, NodeId, NodeKind, PortRef,
};

use crate::error::{PatchError, RecordError, Result};

/// One parsed patch record.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchNode {
    /// A `CST` record.
    Constant {
        /// Initial value.
        value: f32,
        /// UI category.
        category: ControlCategory,
        /// Display label (may be empty).
        label: String,
    },
    /// Any other record: a kind and its wired inputs.
    Module {
        /// Node kind (never [`NodeKind::Constant`]).
        kind: NodeKind,
        /// Inputs in slot order.
        inputs: Vec<PortRef>,
    },
}

impl PatchNode {
    /// Kind of node this record declares.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Constant { .. } => NodeKind::Constant,
            Self::Module { kind, .. } => *kind,
        }
    }
}

/// A parsed and validated patch, in node-index order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PatchSpec {
    pub(crate) nodes: Vec<PatchNode>,
}

impl PatchSpec {
    /// Records in index order.
    pub fn nodes(&self) -> &[PatchNode] {
        &self.nodes
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the patch declares no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocates and wires a [`Graph`] for this patch.
    ///
    /// `period_size` sizes the OutputSink accumulators and normally comes from
    /// the negotiated output device.
    pub fn build(&self, sample_rate: u32, period_size: usize) -> Result<Graph> {
        let mut builder = GraphBuilder::new(self.nodes.len(), sample_rate, period_size)?;
        for (index, node) in self.nodes.iter().enumerate() {
            let id = NodeId::new(index);
            match node {
                PatchNode::Constant {
                    value,
                    category,
                    label,
                } => {
                    builder.allocate_constant(id, Constant::new(*value, *category, label.as_str()))?;
                }
                PatchNode::Module { kind, inputs } => {
                    builder.allocate(id, *kind)?;
                    for (slot, source) in inputs.iter().enumerate() {
                        builder.wire(id, slot, *source)?;
                    }
                }
            }
        }
        Ok(builder.build()?)
    }
}

/// Parses patch text into a [`PatchSpec`].
///
/// # Errors
///
/// Returns [`PatchError::Record`] with the 1-based line number and content of
/// the first bad record, [`PatchError::Empty`] when there are no records, and
/// [`PatchError::Unterminated`] when the text does not end in a newline.
pub fn parse_patch(text: &str) -> Result<PatchSpec> {
    let records: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| (i + 1, line))
        .collect();

    let Some(&(last_line, last)) = records.last() else {
        return Err(PatchError::Empty);
    };
    if !text.ends_with('\n') {
        return Err(PatchError::Unterminated {
            line: text.lines().count(),
            content: text.lines().last().unwrap_or_default().to_string(),
        });
    }

    let count = leading_index(last)
        .map(|index| index.saturating_add(1))
        .map_err(|source| record_error(last_line, last, source))?;

    let mut nodes: Vec<PatchNode> = Vec::with_capacity(records.len());
    for &(line, content) in &records {
        let node = parse_record(content, &nodes, count)
            .map_err(|source| record_error(line, content, source))?;
        nodes.push(node);
    }

    tracing::debug!(nodes = nodes.len(), "patch parsed");
    Ok(PatchSpec { nodes })
}

/// Reads and parses a patch file.
pub fn parse_patch_file(path: &Path) -> Result<PatchSpec> {
    let text = std::fs::read_to_string(path).map_err(|source| PatchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_patch(&text)
}

/// Parses `text` and builds the graph in one step.
pub fn load_graph(text: &str, sample_rate: u32, period_size: usize) -> Result<Graph> {
    parse_patch(text)?.build(sample_rate, period_size)
}

fn record_error(line: usize, content: &str, source: RecordError) -> PatchError {
    PatchError::Record {
        line,
        content: content.trim().to_string(),
        source,
    }
}

fn leading_index(line: &str) -> std::result::Result<usize, RecordError> {
    let token = Fields::new(line)
        .next()
        .ok_or(RecordError::MissingField("node index"))?;
    token
        .parse()
        .map_err(|_| RecordError::BadIndex(token.to_string()))
}

/// Parses one record. `earlier` holds every record above it.
fn parse_record(
    line: &str,
    earlier: &[PatchNode],
    count: usize,
) -> std::result::Result<PatchNode, RecordError> {
    let position = earlier.len();
    let mut fields = Fields::new(line);

    let index = leading_index(line)?;
    fields.next();
    if index >= count {
        return Err(RecordError::IndexOutOfRange { index, count });
    }
    if index < position {
        return Err(RecordError::DuplicateIndex(index));
    }
    if index > position {
        return Err(RecordError::IndexGap {
            expected: position,
            found: index,
        });
    }

    let code = fields.next().ok_or(RecordError::MissingField("node kind"))?;
    let kind = NodeKind::from_code(code).ok_or_else(|| RecordError::UnknownKind(code.to_string()))?;
    if kind == NodeKind::OutputSink
        && let Some(first) = earlier.iter().position(|n| n.kind() == NodeKind::OutputSink)
    {
        return Err(RecordError::SecondOutput { first });
    }

    let node = if kind == NodeKind::Constant {
        let token = fields.next().ok_or(RecordError::MissingField("constant value"))?;
        let value = token
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| RecordError::BadValue(token.to_string()))?;
        let token = fields.next().ok_or(RecordError::MissingField("control category"))?;
        let category = ControlCategory::from_code(token)
            .ok_or_else(|| RecordError::UnknownCategory(token.to_string()))?;
        PatchNode::Constant {
            value,
            category,
            label: fields.remainder().to_string(),
        }
    } else {
        let mut inputs = Vec::with_capacity(kind.input_count());
        for &name in kind.input_names() {
            let token = fields.next().ok_or(RecordError::MissingField(name))?;
            inputs.push(parse_reference(token, earlier)?);
        }
        if let Some(extra) = fields.next() {
            return Err(RecordError::TrailingField(extra.to_string()));
        }
        PatchNode::Module { kind, inputs }
    };
    Ok(node)
}

/// Parses `<node>/<slot>` and checks it against the records above.
fn parse_reference(token: &str, earlier: &[PatchNode]) -> std::result::Result<PortRef, RecordError> {
    let bad = || RecordError::BadReference(token.to_string());
    let (node, slot) = token.split_once('/').ok_or_else(bad)?;
    let node: usize = node.parse().map_err(|_| bad())?;
    let slot: usize = slot.parse().map_err(|_| bad())?;

    let source = earlier.get(node).ok_or_else(|| RecordError::ForwardReference {
        reference: token.to_string(),
    })?;
    let kind = source.kind();
    if slot >= kind.output_count() {
        return Err(RecordError::NoSuchOutput {
            reference: token.to_string(),
            kind,
            outputs: kind.output_count(),
        });
    }
    Ok(PortRef::new(NodeId::new(node), slot))
}

/// Whitespace-separated field cursor over one line.
struct Fields<'a> {
    rest: &'a str,
}

impl<'a> Fields<'a> {
    fn new(line: &'a str) -> Self {
        Self { rest: line }
    }

    fn next(&mut self) -> Option<&'a str> {
        let s = self.rest.trim_start();
        if s.is_empty() {
            self.rest = s;
            return None;
        }
        let end = s.find(char::is_whitespace).unwrap_or(s.len());
        let (token, rest) = s.split_at(end);
        self.rest = rest;
        Some(token)
    }

    /// Everything left on the line, trimmed.
    fn remainder(&mut self) -> &'a str {
        let rest = self.rest.trim();
        self.rest = "";
        rest
    }
}
