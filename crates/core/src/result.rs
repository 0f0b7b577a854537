//! Core results and error types

use thiserror::Error;

/// Core error type encompassing graph construction and ingestion errors.
///
/// Ingestion errors are per-function: a malformed `.cfg` file fails the
/// comparison for that function only. Callers are expected to log the error
/// and continue with the next function rather than abort the batch.
#[derive(Debug, Error)]
pub enum Error {
    /// A vertex identity was registered twice in the same graph.
    #[error("duplicate vertex identity '{0}'")]
    DuplicateVertex(String),

    /// The parsed graph contains no vertices.
    #[error("graph contains no vertices")]
    EmptyGraph,

    /// Failed to read a CFG file at the specified path.
    #[error("could not read file '{path}': {source}")]
    FileRead {
        /// The path to the file that could not be read.
        path: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A node identity carried more than one `:` separator.
    #[error("malformed node identity '{0}': more than one ':' separator")]
    MalformedNodeId(String),

    /// The graph has more than one in-degree-zero vertex.
    #[error("multiple entry vertices found: {0}")]
    MultipleEntryBlocks(usize),

    /// No in-degree-zero vertex exists, so levels cannot be assigned.
    #[error("no entry vertex found")]
    NoEntryBlock,

    /// Failed to parse a CFG statement at the specified line.
    #[error("cfg parse error at line {line}: {msg} in `{raw}`")]
    ParseError {
        /// The line number where parsing failed.
        line: usize,
        /// Description of the parsing error.
        msg: String,
        /// The raw content that failed to parse.
        raw: String,
    },

    /// An edge referenced a vertex identity that does not exist.
    #[error("edge references unknown vertex '{0}'")]
    UnknownVertex(String),
}

/// Core result type
pub type Result<T> = std::result::Result<T, Error>;
