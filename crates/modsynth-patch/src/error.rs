//! Error types for patch loading.

use std::path::PathBuf;

use modsynth_core::{GraphError, NodeKind};
use thiserror::Error;

/// Errors from reading, parsing, or building a patch.
#[derive(Debug, Error)]
pub enum PatchError {
    /// The patch has no records.
    #[error("patch is empty")]
    Empty,

    /// The final line has no terminating newline.
    #[error("line {line}: missing newline at end of patch: `{content}`")]
    Unterminated {
        /// 1-based line number.
        line: usize,
        /// The unterminated line.
        content: String,
    },

    /// A record is malformed or fails validation.
    #[error("line {line}: {source}: `{content}`")]
    Record {
        /// 1-based line number.
        line: usize,
        /// The offending line, trimmed.
        content: String,
        /// What is wrong with it.
        source: RecordError,
    },

    /// The parsed patch could not be turned into a graph.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The patch file could not be read.
    #[error("failed to read patch '{path}': {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl PatchError {
    /// 1-based line number the error refers to, when there is one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Unterminated { line, .. } | Self::Record { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Problems with a single patch record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    /// The leading index is not a non-negative integer.
    #[error("invalid node index '{0}'")]
    BadIndex(String),

    /// The index was already used by an earlier record.
    #[error("node index {0} reused")]
    DuplicateIndex(usize),

    /// The index skips ahead of the record's position.
    #[error("expected node index {expected}, found {found}")]
    IndexGap {
        /// Index implied by the record's position.
        expected: usize,
        /// Index on the line.
        found: usize,
    },

    /// The index is not below the node count taken from the last record.
    #[error("node index {index} outside declared range 0..{count}")]
    IndexOutOfRange {
        /// Index on the line.
        index: usize,
        /// Node count derived from the last record.
        count: usize,
    },

    /// The line ends before a required field.
    #[error("missing {0}")]
    MissingField(&'static str),

    /// The kind token is not a known node kind.
    #[error("unknown node kind '{0}'")]
    UnknownKind(String),

    /// The constant value is not a finite number.
    #[error("invalid constant value '{0}'")]
    BadValue(String),

    /// The category token is not one of HFO, LFO, PER, NDS.
    #[error("unknown control category '{0}'")]
    UnknownCategory(String),

    /// An input token is not of the form `<node>/<slot>`.
    #[error("invalid input reference '{0}'")]
    BadReference(String),

    /// An input names this node or a later one.
    #[error("input {reference} does not refer to an earlier node")]
    ForwardReference {
        /// The reference as written.
        reference: String,
    },

    /// An input names an output slot the referenced node does not have.
    #[error("input {reference}: {kind} has {outputs} output(s)")]
    NoSuchOutput {
        /// The reference as written.
        reference: String,
        /// Kind of the referenced node.
        kind: NodeKind,
        /// Its output count.
        outputs: usize,
    },

    /// Extra tokens after the last expected field.
    #[error("unexpected trailing field '{0}'")]
    TrailingField(String),

    /// A patch drives a single output device, so only one `OUT` is allowed.
    #[error("second output sink; node {first} is already the output")]
    SecondOutput {
        /// Index of the earlier `OUT` record.
        first: usize,
    },
}

/// Result alias for patch operations.
pub type Result<T> = std::result::Result<T, PatchError>;
