//! Approximate CFG diffing and cross-version classification.
//!
//! Given per-function CFGs from two build versions, [`match_graphs`]
//! computes a best-effort block correspondence via an exact minimum-cost
//! assignment over a blended dissimilarity metric, [`classify_edges`]
//! derives the conserved/deleted/added edge sets, and
//! [`classify_candidate`] runs the machinery three-way to score whether a
//! historical build still carries a vulnerability that a later patch fixed.

pub mod assignment;
pub mod correspondence;
pub mod metric;
pub mod verdict;

pub use correspondence::{EdgeClasses, GraphDiff, MatchedPair, classify_edges, match_graphs};
pub use metric::Weights;
pub use verdict::{Classification, Summary, Verdict, classify_candidate};

use thiserror::Error;

/// Error type for diff and classification computation.
#[derive(Debug, Error)]
pub enum Error {
    /// Metric weights do not sum to 1.0.
    #[error("metric weights must sum to 1.0, got {0}")]
    InvalidWeights(f64),

    /// Weight override string could not be parsed.
    #[error("invalid weight specification '{0}': expected four comma-separated values")]
    InvalidWeightSpec(String),
}

/// Analysis result type
pub type Result<T> = std::result::Result<T, Error>;
