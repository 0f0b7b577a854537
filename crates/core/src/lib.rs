//! CFG model and ingestion for cross-version patch-presence analysis.
//!
//! `relict-core` owns the data the rest of the system operates on: the
//! per-function basic-block graph ([`graph::Cfg`]), the op-type projection
//! that matching is defined over, and the parser for the textual CFG files
//! the build pipeline materializes per `{target}/{commit}/{function}`.

pub mod graph;
pub mod ingest;
pub mod result;

pub use graph::{Cfg, EdgeRecord, Vertex, op_type_of};
pub use ingest::{load_cfg, parse_cfg};
pub use result::{Error, Result};
