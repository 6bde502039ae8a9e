//! Patch text writer.
//!
//! Serializes a [`PatchSpec`] or a live [`Graph`] back to the patch format.
//! Output always parses back to an equal [`PatchSpec`]: records are written in
//! index order, constants use Rust's shortest round-trip float form, and every
//! line ends in a newline.

use std::fmt;

use modsynth_core::{Graph, NodeKind};

use crate::parser::{PatchNode, PatchSpec};

impl PatchSpec {
    /// Captures the structure of `graph`.
    ///
    /// Constants are recorded with their current value, so a patch saved from a
    /// running graph restores what is playing.
    pub fn from_graph(graph: &Graph) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .map(|node| match (node.kind(), node.constant()) {
                (NodeKind::Constant, Some(c)) => PatchNode::Constant {
                    value: c.value(),
                    category: c.category(),
                    label: c.label().to_string(),
                },
                (kind, _) => PatchNode::Module {
                    kind,
                    inputs: node.inputs().to_vec(),
                },
            })
            .collect();
        Self { nodes }
    }
}

impl fmt::Display for PatchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, node) in self.nodes.iter().enumerate() {
            write!(f, "{index} {}", node.kind())?;
            match node {
                PatchNode::Constant {
                    value,
                    category,
                    label,
                } => {
                    write!(f, " {value:?} {category}")?;
                    let label = single_line(label);
                    if !label.is_empty() {
                        write!(f, " {label}")?;
                    }
                }
                PatchNode::Module { inputs, .. } => {
                    for input in inputs {
                        write!(f, " {input}")?;
                    }
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Serializes `graph` to patch text.
pub fn write_patch(graph: &Graph) -> String {
    PatchSpec::from_graph(graph).to_string()
}

/// Labels end at the line break.
fn single_line(label: &str) -> String {
    label.split(['\r', '\n']).collect::<Vec<_>>().join(" ").trim().to_string()
}
