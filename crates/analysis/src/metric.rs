//! Pairwise vertex dissimilarity.
//!
//! The cost of pairing two blocks blends an instruction-content edit
//! distance with three structural signals (relative depth, in-degree,
//! out-degree). Call targets are weighted far more heavily than generic
//! opcode churn: two structurally rewritten blocks that call the same
//! function are strong equivalence evidence.

use crate::{Error, Result};
use petgraph::stable_graph::NodeIndex;
use relict_core::Cfg;
use serde::{Deserialize, Serialize};

/// Weight of the full-sequence distance inside the blended instruction term.
const FULL_SEQUENCE_WEIGHT: f64 = 0.3;
/// Weight of the call-only distance inside the blended instruction term.
const CALL_SEQUENCE_WEIGHT: f64 = 0.7;

/// Weights of the four cost terms. Must sum to exactly 1.0 so the combined
/// cost stays in [0, 1]; validated once at construction, not per pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    /// Instruction edit-distance term.
    pub instruction: f64,
    /// Relative-depth difference term.
    pub level: f64,
    /// In-degree difference term.
    pub in_degree: f64,
    /// Out-degree difference term.
    pub out_degree: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            instruction: 0.50,
            level: 0.20,
            in_degree: 0.15,
            out_degree: 0.15,
        }
    }
}

impl Weights {
    /// Validates that the weights sum to 1.0 (within floating-point noise).
    pub fn validated(self) -> Result<Self> {
        let sum = self.instruction + self.level + self.in_degree + self.out_degree;
        if (sum - 1.0).abs() > 1e-9 {
            return Err(Error::InvalidWeights(sum));
        }
        Ok(self)
    }

    /// Parses a `instruction,level,in,out` override string and validates it.
    pub fn parse(spec: &str) -> Result<Self> {
        let values: Vec<f64> = spec
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| Error::InvalidWeightSpec(spec.to_string()))?;
        let &[instruction, level, in_degree, out_degree] = values.as_slice() else {
            return Err(Error::InvalidWeightSpec(spec.to_string()));
        };
        Self {
            instruction,
            level,
            in_degree,
            out_degree,
        }
        .validated()
    }
}

/// Plain edit distance between two token sequences (insert/delete/substitute
/// cost 1, match cost 0).
pub fn edit_distance(a: &[String], b: &[String]) -> u32 {
    let (la, lb) = (a.len(), b.len());
    let mut prev: Vec<u32> = (0..=lb as u32).collect();
    let mut cur = vec![0u32; lb + 1];

    for i in 1..=la {
        cur[0] = i as u32;
        for j in 1..=lb {
            cur[j] = if a[i - 1] == b[j - 1] {
                prev[j - 1]
            } else {
                prev[j - 1].min(prev[j]).min(cur[j - 1]) + 1
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[lb]
}

/// Edit distance normalized by `max(len_a, len_b, 1)`, in [0, 1].
pub fn normalized_edit_distance(a: &[String], b: &[String]) -> f64 {
    let denom = a.len().max(b.len()).max(1) as f64;
    f64::from(edit_distance(a, b)) / denom
}

/// Instruction-content distance over two op-type sequences.
///
/// When both sequences contain at least one call token, the distance is
/// recomputed over the call-only subsequences and blended 0.3/0.7 in favor
/// of call-target identity.
pub fn instruction_distance(a: &[String], b: &[String]) -> f64 {
    let full = normalized_edit_distance(a, b);

    let calls_a: Vec<String> = a.iter().filter(|t| is_call(t)).cloned().collect();
    let calls_b: Vec<String> = b.iter().filter(|t| is_call(t)).cloned().collect();
    if calls_a.is_empty() || calls_b.is_empty() {
        return full;
    }

    let call_only = normalized_edit_distance(&calls_a, &calls_b);
    FULL_SEQUENCE_WEIGHT * full + CALL_SEQUENCE_WEIGHT * call_only
}

/// Returns true for `call ...` op-type tokens.
fn is_call(op_type: &str) -> bool {
    op_type.starts_with("call ")
}

/// Combined dissimilarity of two vertices, one from each graph.
///
/// Cost against a padding vertex is maximal; padding against padding is
/// free, so surplus padding pairs off with itself. Level normalization uses
/// each vertex's own graph maximum so graphs of very different size remain
/// comparable by relative depth.
pub fn vertex_cost(weights: &Weights, old: &Cfg, a: NodeIndex, new: &Cfg, b: NodeIndex) -> f64 {
    let (Some(va), Some(vb)) = (old.vertex_at(a), new.vertex_at(b)) else {
        return 1.0;
    };

    match (va.is_padding(), vb.is_padding()) {
        (true, true) => return 0.0,
        (true, false) | (false, true) => return 1.0,
        (false, false) => {}
    }

    let ir = instruction_distance(&va.op_types, &vb.op_types);

    let level = match (va.level, vb.level) {
        (Some(la), Some(lb)) => {
            let max_a = f64::from(old.max_level().max(1));
            let max_b = f64::from(new.max_level().max(1));
            (f64::from(la) / max_a - f64::from(lb) / max_b).abs()
        }
        _ => 1.0,
    };

    let in_diff = degree_difference(old.in_degree(a), new.in_degree(b));
    let out_diff = degree_difference(old.out_degree(a), new.out_degree(b));

    weights.instruction * ir
        + weights.level * level
        + weights.in_degree * in_diff
        + weights.out_degree * out_diff
}

/// Relative degree difference `|a − b| / max(a, b, 1)`.
fn degree_difference(a: usize, b: usize) -> f64 {
    (a.abs_diff(b) as f64) / (a.max(b).max(1) as f64)
}
