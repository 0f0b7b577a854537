//! Basic-block graph model for one compiled function.
//!
//! A [`Cfg`] holds the basic blocks of a single function for one build
//! version. Blocks carry their raw IR lines plus a derived *op-type
//! projection* (opcode or call target per instruction) that deliberately
//! discards operand and register detail, so that insignificant renaming
//! between versions does not defeat block matching. Graphs are built once
//! per ingested file and never mutated afterwards; the only exception is
//! the transient padding copies the correspondence solver makes to equalize
//! vertex counts between two versions.

use crate::result::{Error, Result};
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Sentinel SSA id for padding or otherwise unset vertices.
pub const SSA_UNSET: i64 = -1;

/// A basic block: identity, SSA id, raw instruction lines, and the derived
/// op-type projection used for matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    /// Block identity, unique within a graph. The empty string is reserved
    /// for padding vertices.
    pub name: String,
    /// SSA id of the block ([`SSA_UNSET`] when unknown).
    pub ssa_id: i64,
    /// Raw ordered instruction lines.
    pub instructions: Vec<String>,
    /// Derived op-type projection, one token per instruction.
    pub op_types: Vec<String>,
    /// BFS depth from the entry vertex. `None` for padding vertices and
    /// vertices unreachable from the entry.
    pub level: Option<u32>,
}

impl Vertex {
    /// Creates a block and derives its op-type projection.
    pub fn new(name: impl Into<String>, ssa_id: i64, instructions: Vec<String>) -> Self {
        let op_types = instructions.iter().map(|i| op_type_of(i)).collect();
        Self {
            name: name.into(),
            ssa_id,
            instructions,
            op_types,
            level: None,
        }
    }

    /// Creates a padding vertex used to equalize cardinality between two
    /// graphs before the assignment solve. Padding has no identity, no
    /// instructions, no level, and never any edges.
    pub fn padding() -> Self {
        Self {
            name: String::new(),
            ssa_id: SSA_UNSET,
            instructions: Vec::new(),
            op_types: Vec::new(),
            level: None,
        }
    }

    /// Returns true for padding vertices.
    pub fn is_padding(&self) -> bool {
        self.name.is_empty()
    }
}

/// Matching equality is defined over (instruction sequence, ssa id), not
/// identity: two versions of a function address their blocks differently.
impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.instructions == other.instructions && self.ssa_id == other.ssa_id
    }
}

/// Projects one IR instruction onto its op-type token.
///
/// Call instructions collapse to `"call <symbol>"` where `<symbol>` is the
/// `@`-prefixed callee name before the argument list (`"call "` when the
/// callee cannot be resolved). Assignments take the opcode after `=`; any
/// other instruction takes its first token.
pub fn op_type_of(instruction: &str) -> String {
    if instruction.contains("call") {
        return format!("call {}", callee_symbol(instruction).unwrap_or_default());
    }

    let mut tokens = instruction.split_whitespace();
    let first = tokens.next().unwrap_or_default();
    if tokens.next() == Some("=") {
        if let Some(opcode) = tokens.next() {
            return opcode.to_string();
        }
    }
    first.to_string()
}

/// Extracts the `@name` callee immediately preceding `(`, without the `@`.
fn callee_symbol(instruction: &str) -> Option<String> {
    let bytes = instruction.as_bytes();
    for (start, &b) in bytes.iter().enumerate() {
        if b != b'@' {
            continue;
        }
        let mut end = start + 1;
        while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
            end += 1;
        }
        if end < bytes.len() && bytes[end] == b'(' {
            return Some(instruction[start + 1..end].to_string());
        }
    }
    None
}

/// A directed edge by vertex identity, with optional branch-label metadata
/// taken from the `:<branchlabel>` suffix of the edge source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Source vertex identity.
    pub src: String,
    /// Destination vertex identity.
    pub dst: String,
    /// Branch label, when the outgoing branch was named.
    pub label: Option<String>,
}

/// Control-flow graph of one function in one build version.
#[derive(Debug, Clone, Default)]
pub struct Cfg {
    graph: StableDiGraph<Vertex, Option<String>>,
    by_name: HashMap<String, NodeIndex>,
}

impl Cfg {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vertex. Non-padding identities must be unique; padding
    /// vertices bypass the identity index entirely.
    pub fn add_vertex(&mut self, vertex: Vertex) -> Result<NodeIndex> {
        if !vertex.is_padding() && self.by_name.contains_key(&vertex.name) {
            return Err(Error::DuplicateVertex(vertex.name));
        }
        let name = vertex.name.clone();
        let idx = self.graph.add_node(vertex);
        if !name.is_empty() {
            self.by_name.insert(name, idx);
        }
        Ok(idx)
    }

    /// Adds an edge between two existing identities. Duplicate edges are
    /// permitted; both endpoints must already be present.
    pub fn add_edge(&mut self, src: &str, dst: &str, label: Option<String>) -> Result<()> {
        let s = self
            .by_name
            .get(src)
            .copied()
            .ok_or_else(|| Error::UnknownVertex(src.to_string()))?;
        let d = self
            .by_name
            .get(dst)
            .copied()
            .ok_or_else(|| Error::UnknownVertex(dst.to_string()))?;
        self.graph.add_edge(s, d, label);
        Ok(())
    }

    /// Looks up a vertex by identity.
    pub fn vertex(&self, name: &str) -> Option<&Vertex> {
        self.by_name.get(name).map(|&idx| &self.graph[idx])
    }

    /// Returns the node index for an identity.
    pub fn index_of(&self, name: &str) -> Option<NodeIndex> {
        self.by_name.get(name).copied()
    }

    /// Returns the vertex stored at a node index.
    pub fn vertex_at(&self, idx: NodeIndex) -> Option<&Vertex> {
        self.graph.node_weight(idx)
    }

    /// Iterates node indices in insertion order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Number of vertices, padding included.
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Identities of all non-padding vertices in insertion order.
    pub fn vertex_names(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .filter_map(|idx| {
                let v = &self.graph[idx];
                (!v.is_padding()).then_some(v.name.as_str())
            })
            .collect()
    }

    /// In-degree of the vertex at `idx`.
    pub fn in_degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Incoming).count()
    }

    /// Out-degree of the vertex at `idx`.
    pub fn out_degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Outgoing).count()
    }

    /// Returns true when an edge `src -> dst` exists.
    pub fn has_edge(&self, src: &str, dst: &str) -> bool {
        match (self.by_name.get(src), self.by_name.get(dst)) {
            (Some(&s), Some(&d)) => self.graph.find_edge(s, d).is_some(),
            _ => false,
        }
    }

    /// All edges as identity records, in edge-insertion order.
    pub fn edges(&self) -> Vec<EdgeRecord> {
        self.graph
            .edge_references()
            .map(|e| EdgeRecord {
                src: self.graph[e.source()].name.clone(),
                dst: self.graph[e.target()].name.clone(),
                label: e.weight().clone(),
            })
            .collect()
    }

    /// Looks up the stored edge record for `src -> dst`, if present.
    pub fn edge(&self, src: &str, dst: &str) -> Option<EdgeRecord> {
        let (&s, &d) = (self.by_name.get(src)?, self.by_name.get(dst)?);
        let e = self.graph.find_edge(s, d)?;
        Some(EdgeRecord {
            src: src.to_string(),
            dst: dst.to_string(),
            label: self.graph.edge_weight(e).cloned().flatten(),
        })
    }

    /// Successor identities of `name`.
    pub fn successors(&self, name: &str) -> Vec<&str> {
        self.by_name
            .get(name)
            .map(|&idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Outgoing)
                    .map(|n| self.graph[n].name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Predecessor identities of `name`.
    pub fn predecessors(&self, name: &str) -> Vec<&str> {
        self.by_name
            .get(name)
            .map(|&idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .map(|n| self.graph[n].name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Locates the unique entry vertex (in-degree zero, padding excluded).
    pub fn entry(&self) -> Result<NodeIndex> {
        let mut entries = self.graph.node_indices().filter(|&idx| {
            !self.graph[idx].is_padding() && self.in_degree(idx) == 0
        });
        let first = entries.next().ok_or(Error::NoEntryBlock)?;
        let extra = entries.count();
        if extra > 0 {
            return Err(Error::MultipleEntryBlocks(extra + 1));
        }
        Ok(first)
    }

    /// Assigns BFS shortest-path depth levels from the entry vertex.
    ///
    /// Vertices unreachable from the entry keep the `None` sentinel.
    pub fn assign_levels(&mut self) -> Result<()> {
        let entry = self.entry()?;
        let mut queue = VecDeque::new();
        self.graph[entry].level = Some(0);
        queue.push_back(entry);

        while let Some(idx) = queue.pop_front() {
            let depth = self.graph[idx].level.unwrap_or(0);
            let next: Vec<NodeIndex> = self
                .graph
                .neighbors_directed(idx, Direction::Outgoing)
                .collect();
            for n in next {
                if self.graph[n].level.is_none() {
                    self.graph[n].level = Some(depth + 1);
                    queue.push_back(n);
                }
            }
        }
        Ok(())
    }

    /// Maximum assigned level, 0 for a graph without levels.
    pub fn max_level(&self) -> u32 {
        self.graph
            .node_indices()
            .filter_map(|idx| self.graph[idx].level)
            .max()
            .unwrap_or(0)
    }
}
