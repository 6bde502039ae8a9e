//! Patch files for modsynth: parse text into a graph, write a graph as text.
//!
//! A patch is a line-oriented description of a module graph:
//!
//! ```text
//! 0 CST 440.0 HFO Tone
//! 1 OCC 0/0
//! 2 OUT 1/0
//! ```
//!
//! Each line declares one node: its index, a three-letter kind, and either a
//! constant's value, category and label, or one `<node>/<slot>` reference per
//! input. See [`parser`] for the full grammar and validation rules.
//!
//! # Example
//!
//! ```rust
//! use modsynth_patch::{load_graph, write_patch};
//!
//! let text = "0 CST 440.0 HFO Tone\n1 OCC 0/0\n2 OUT 1/0\n";
//! let graph = load_graph(text, 48000, 256)?;
//! assert_eq!(graph.len(), 3);
//! assert_eq!(write_patch(&graph), text);
//! # Ok::<(), modsynth_patch::PatchError>(())
//! ```

pub mod error;
pub mod parser;
pub mod writer;

pub use error::{PatchError, RecordError, Result};
pub use parser::{PatchNode, PatchSpec, load_graph, parse_patch, parse_patch_file};
pub use writer::write_patch;
