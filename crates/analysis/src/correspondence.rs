//! Block correspondence between two CFG versions and the edge
//! classification derived from it.
//!
//! The solver pads the smaller graph with null vertices to equal
//! cardinality, prices every (old, new) vertex pair with the dissimilarity
//! metric, and solves the assignment exactly. The resulting pairing is then
//! partitioned into "same" and "different" blocks and projected onto the
//! edge sets of both graphs to classify each edge as conserved, deleted,
//! or added.

use crate::assignment;
use crate::metric::{Weights, vertex_cost};
use petgraph::stable_graph::NodeIndex;
use relict_core::{Cfg, EdgeRecord, Vertex};
use serde::Serialize;
use std::collections::HashMap;

/// One matched vertex pair with its assignment cost.
#[derive(Debug, Clone, Serialize)]
pub struct MatchedPair {
    /// Vertex from the old graph (padding when the new graph is larger).
    pub old: Vertex,
    /// Vertex from the new graph (padding when the old graph is larger).
    pub new: Vertex,
    /// Metric cost of this pair in the solved assignment.
    pub cost: f64,
}

impl MatchedPair {
    /// True when either side of the pair is a padding vertex.
    pub fn touches_padding(&self) -> bool {
        self.old.is_padding() || self.new.is_padding()
    }
}

/// Full correspondence between two graph versions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphDiff {
    /// Pairs with identical op-type projections.
    pub same: Vec<MatchedPair>,
    /// All other pairs, padding pairs included.
    pub diff: Vec<MatchedPair>,
    /// old identity → new identity, padding excluded.
    pub forward: HashMap<String, String>,
    /// new identity → old identity, padding excluded.
    pub backward: HashMap<String, String>,
    /// Total assignment cost.
    pub total_cost: f64,
}

impl GraphDiff {
    /// Maps an old-graph identity to its new-graph counterpart.
    pub fn match_forward(&self, old: &str) -> Option<&str> {
        self.forward.get(old).map(String::as_str)
    }

    /// Maps a new-graph identity back to its old-graph counterpart.
    pub fn match_backward(&self, new: &str) -> Option<&str> {
        self.backward.get(new).map(String::as_str)
    }

    /// Iterates all pairs, same before different.
    pub fn pairs(&self) -> impl Iterator<Item = &MatchedPair> {
        self.same.iter().chain(self.diff.iter())
    }
}

/// Computes the vertex correspondence between two graph versions.
///
/// Operates on private padded copies; the inputs are never mutated. Two
/// empty graphs produce an empty correspondence rather than an error.
pub fn match_graphs(old: &Cfg, new: &Cfg, weights: &Weights) -> GraphDiff {
    let mut old = old.clone();
    let mut new = new.clone();
    pad_to_equal_cardinality(&mut old, &mut new);

    let order_old: Vec<NodeIndex> = old.node_indices().collect();
    let order_new: Vec<NodeIndex> = new.node_indices().collect();
    let n = order_old.len();
    if n == 0 {
        return GraphDiff::default();
    }

    let cost: Vec<Vec<f64>> = order_old
        .iter()
        .map(|&a| {
            order_new
                .iter()
                .map(|&b| vertex_cost(weights, &old, a, &new, b))
                .collect()
        })
        .collect();

    let assignment = assignment::solve(&cost);
    let total_cost = assignment::total_cost(&cost, &assignment);
    tracing::debug!(
        vertices = n,
        total_cost,
        "solved block correspondence assignment"
    );

    let mut result = GraphDiff {
        total_cost,
        ..GraphDiff::default()
    };

    for (row, &col) in assignment.iter().enumerate() {
        let Some(v_old) = old.vertex_at(order_old[row]) else {
            continue;
        };
        let Some(v_new) = new.vertex_at(order_new[col]) else {
            continue;
        };
        let pair = MatchedPair {
            old: v_old.clone(),
            new: v_new.clone(),
            cost: cost[row][col],
        };

        if !pair.touches_padding() {
            result
                .forward
                .insert(pair.old.name.clone(), pair.new.name.clone());
            result
                .backward
                .insert(pair.new.name.clone(), pair.old.name.clone());
        }

        if !pair.touches_padding() && pair.old.op_types == pair.new.op_types {
            result.same.push(pair);
        } else {
            result.diff.push(pair);
        }
    }

    result
}

/// Adds padding vertices to the smaller graph until both have the same
/// vertex count. Padding carries no edges, so it can only pair expensively
/// with real vertices and freely with other padding.
fn pad_to_equal_cardinality(old: &mut Cfg, new: &mut Cfg) {
    let (co, cn) = (old.vertex_count(), new.vertex_count());
    let grow = |g: &mut Cfg, by: usize| {
        for _ in 0..by {
            // Padding bypasses the identity index, so this cannot fail.
            let _ = g.add_vertex(Vertex::padding());
        }
    };
    if co < cn {
        grow(old, cn - co);
    } else if cn < co {
        grow(new, co - cn);
    }
}

/// Edge sets classified relative to a correspondence.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EdgeClasses {
    /// Old edge paired with the corresponding new edge.
    pub conserved: Vec<(EdgeRecord, EdgeRecord)>,
    /// Old edges with no counterpart in the new graph.
    pub deleted: Vec<EdgeRecord>,
    /// New edges with no counterpart in the old graph.
    pub added: Vec<EdgeRecord>,
}

/// Classifies every edge of both graphs against a correspondence.
///
/// An old edge `(u, v)` is conserved iff both endpoints map forward and
/// `(match(u), match(v))` is an edge of the new graph; otherwise it is
/// deleted. A new edge is added iff an endpoint lacks a backward match or
/// the mapped edge is absent from the old graph. A missing match is always
/// treated as "not conserved"; a counterpart is never fabricated.
pub fn classify_edges(old: &Cfg, new: &Cfg, diff: &GraphDiff) -> EdgeClasses {
    let mut classes = EdgeClasses::default();

    for e_old in old.edges() {
        let mapped = diff
            .match_forward(&e_old.src)
            .zip(diff.match_forward(&e_old.dst));
        match mapped {
            Some((src, dst)) if new.has_edge(src, dst) => {
                // Endpoint lookups succeeded, so the new edge exists.
                if let Some(e_new) = new.edge(src, dst) {
                    classes.conserved.push((e_old, e_new));
                }
            }
            _ => classes.deleted.push(e_old),
        }
    }

    for e_new in new.edges() {
        let mapped = diff
            .match_backward(&e_new.src)
            .zip(diff.match_backward(&e_new.dst));
        let conserved = matches!(mapped, Some((src, dst)) if old.has_edge(src, dst));
        if !conserved {
            classes.added.push(e_new);
        }
    }

    classes
}
