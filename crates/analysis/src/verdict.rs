//! Three-way vulnerability-presence classification.
//!
//! The patch signature is the diff between the known-vulnerable graph V and
//! the known-patched graph P: the blocks and edges the patch removed, plus
//! the edges it introduced. A historical candidate H is then matched
//! against both endpoints: a backward pass (H vs V) checks whether the
//! removed material is still present, a forward pass (H vs P) checks
//! whether the fix-specific wiring already exists. Every check lands in a
//! confusion-matrix bucket:
//!
//! - removed block/edge found in H   → true positive (still vulnerable)
//! - removed block/edge absent in H  → false negative
//! - fix-only edge already in H      → false positive (fix signature is
//!   not discriminative for this candidate)
//! - fix-only edge absent in H       → true negative
//!
//! A missing or unconserved match never produces a true positive; the
//! classifier fails toward false negative.

use crate::correspondence::{EdgeClasses, GraphDiff, classify_edges, match_graphs};
use crate::metric::Weights;
use relict_core::{Cfg, EdgeRecord};
use serde::Serialize;
use std::collections::HashSet;

/// What a verdict record refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    /// A basic block removed by the patch.
    Vertex,
    /// A control-flow edge removed or introduced by the patch.
    Edge,
}

/// Which correspondence pass produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Candidate matched against the vulnerable version.
    Backward,
    /// Candidate matched against the patched version.
    Forward,
}

/// Confusion-matrix bucket for one signature element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Vulnerable pattern detected in the candidate.
    Tp,
    /// Fix-only pattern detected: would wrongly flag the candidate.
    Fp,
    /// Fix-only pattern absent, correctly not flagged.
    Tn,
    /// Vulnerable pattern not detected in the candidate.
    Fn,
}

/// Per-element verdict in the classification stream.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    /// Vertex or edge.
    pub kind: SubjectKind,
    /// Pass that produced this verdict.
    pub direction: Direction,
    /// Confusion-matrix bucket.
    pub outcome: Outcome,
    /// Identity of the signature element (source identity for edges).
    pub subject_src: String,
    /// Destination identity for edge subjects.
    pub subject_dst: Option<String>,
    /// Mapped identity in the candidate graph, when a match existed.
    pub mapped_src: Option<String>,
    /// Mapped destination identity for edge subjects.
    pub mapped_dst: Option<String>,
}

/// Aggregated confusion matrix with derived ratios.
///
/// Ratios are `None` when their denominator is zero (e.g. a signature with
/// no deleted material has no recall to speak of); they never panic and
/// never produce NaN.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Summary {
    /// True positives.
    pub tp: u32,
    /// False positives.
    pub fp: u32,
    /// True negatives.
    pub tn: u32,
    /// False negatives.
    #[serde(rename = "fn")]
    pub fneg: u32,
    /// `(tp + tn) / total`.
    pub accuracy: Option<f64>,
    /// `tp / (tp + fn)`.
    pub recall: Option<f64>,
    /// `tp / (tp + fp)`.
    pub precision: Option<f64>,
}

impl Summary {
    fn from_verdicts(verdicts: &[Verdict]) -> Self {
        let mut s = Summary::default();
        for v in verdicts {
            match v.outcome {
                Outcome::Tp => s.tp += 1,
                Outcome::Fp => s.fp += 1,
                Outcome::Tn => s.tn += 1,
                Outcome::Fn => s.fneg += 1,
            }
        }
        s.accuracy = ratio(s.tp + s.tn, s.tp + s.fp + s.tn + s.fneg);
        s.recall = ratio(s.tp, s.tp + s.fneg);
        s.precision = ratio(s.tp, s.tp + s.fp);
        s
    }
}

fn ratio(num: u32, denom: u32) -> Option<f64> {
    (denom != 0).then(|| f64::from(num) / f64::from(denom))
}

/// Result of classifying one candidate build.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    /// Per-element verdict stream, deleted vertices first, then deleted
    /// edges, then added edges.
    pub verdicts: Vec<Verdict>,
    /// Aggregated confusion matrix.
    pub summary: Summary,
}

/// Scores whether `candidate` still carries the vulnerability whose fix is
/// the difference between `vulnerable` and `patched`.
pub fn classify_candidate(
    vulnerable: &Cfg,
    patched: &Cfg,
    candidate: &Cfg,
    weights: &Weights,
) -> Classification {
    // Patch signature: what the fix removed and what it introduced.
    let signature = match_graphs(vulnerable, patched, weights);
    let signature_edges = classify_edges(vulnerable, patched, &signature);

    let deleted: HashSet<&str> = signature
        .diff
        .iter()
        .filter(|p| !p.old.is_padding())
        .map(|p| p.old.name.as_str())
        .collect();
    let retained: HashSet<&str> = signature
        .same
        .iter()
        .map(|p| p.old.name.as_str())
        .collect();

    tracing::debug!(
        deleted_vertices = deleted.len(),
        deleted_edges = signature_edges.deleted.len(),
        added_edges = signature_edges.added.len(),
        "extracted patch signature"
    );

    let backward = match_graphs(candidate, vulnerable, weights);
    let forward = match_graphs(candidate, patched, weights);

    let mut verdicts = Vec::new();
    score_deleted_vertices(&mut verdicts, &deleted, vulnerable, candidate, &backward);
    score_deleted_edges(
        &mut verdicts,
        &signature_edges,
        &deleted,
        &retained,
        vulnerable,
        candidate,
        &backward,
    );
    score_added_edges(&mut verdicts, &signature_edges, patched, candidate, &forward);

    let summary = Summary::from_verdicts(&verdicts);
    Classification { verdicts, summary }
}

/// True iff every op-type token of the reference vertex is present in the
/// candidate match's projection, i.e. the candidate still performs at least the
/// operations the reference version performed. Set membership, not
/// multiset: duplicated opcodes are deliberately judged leniently.
fn conserves(reference: &Cfg, ref_name: &str, candidate: &Cfg, cand_name: &str) -> bool {
    let (Some(r), Some(c)) = (reference.vertex(ref_name), candidate.vertex(cand_name)) else {
        return false;
    };
    let available: HashSet<&str> = c.op_types.iter().map(String::as_str).collect();
    r.op_types.iter().all(|t| available.contains(t.as_str()))
}

/// Backward-maps a vulnerable-version identity into the candidate and
/// checks conservation. `None` means no usable match.
fn conserved_match<'a>(
    diff: &'a GraphDiff,
    reference: &Cfg,
    candidate: &Cfg,
    ref_name: &str,
) -> Option<&'a str> {
    let mapped = diff.match_backward(ref_name)?;
    conserves(reference, ref_name, candidate, mapped).then_some(mapped)
}

/// Blocks the patch removed should still be present in a vulnerable
/// candidate: a conserved backward match is a true positive, anything less
/// is a false negative.
fn score_deleted_vertices(
    verdicts: &mut Vec<Verdict>,
    deleted: &HashSet<&str>,
    vulnerable: &Cfg,
    candidate: &Cfg,
    backward: &GraphDiff,
) {
    // HashSet order is unstable; emit in the vulnerable graph's order.
    for name in vulnerable.vertex_names() {
        if !deleted.contains(name) {
            continue;
        }
        let mapped = backward.match_backward(name);
        let outcome = match conserved_match(backward, vulnerable, candidate, name) {
            Some(_) => Outcome::Tp,
            None => Outcome::Fn,
        };
        verdicts.push(Verdict {
            kind: SubjectKind::Vertex,
            direction: Direction::Backward,
            outcome,
            subject_src: name.to_string(),
            subject_dst: None,
            mapped_src: mapped.map(str::to_string),
            mapped_dst: None,
        });
    }
}

/// Edges the patch removed, scored by which endpoints the patch also
/// removed: deleted endpoints must additionally be conserved in the
/// candidate, retained endpoints only need a backward match. In every case
/// the mapped edge itself must exist in the candidate for a true positive.
fn score_deleted_edges(
    verdicts: &mut Vec<Verdict>,
    signature_edges: &EdgeClasses,
    deleted: &HashSet<&str>,
    retained: &HashSet<&str>,
    vulnerable: &Cfg,
    candidate: &Cfg,
    backward: &GraphDiff,
) {
    for edge in &signature_edges.deleted {
        let EdgeRecord { src, dst, .. } = edge;
        let src_mapped = backward.match_backward(src);
        let dst_mapped = backward.match_backward(dst);

        let mapped_edge_present = matches!(
            (src_mapped, dst_mapped),
            (Some(s), Some(d)) if candidate.has_edge(s, d)
        );
        let src_ok = || conserved_match(backward, vulnerable, candidate, src).is_some();
        let dst_ok = || conserved_match(backward, vulnerable, candidate, dst).is_some();

        let detected = match (
            deleted.contains(src.as_str()),
            deleted.contains(dst.as_str()),
        ) {
            (true, true) => mapped_edge_present && src_ok() && dst_ok(),
            (false, true) if retained.contains(src.as_str()) => mapped_edge_present && dst_ok(),
            (true, false) if retained.contains(dst.as_str()) => mapped_edge_present && src_ok(),
            (false, false)
                if retained.contains(src.as_str()) && retained.contains(dst.as_str()) =>
            {
                mapped_edge_present
            }
            _ => {
                tracing::warn!(
                    %src,
                    %dst,
                    "deleted edge endpoint neither deleted nor retained; scoring false negative"
                );
                false
            }
        };

        verdicts.push(Verdict {
            kind: SubjectKind::Edge,
            direction: Direction::Backward,
            outcome: if detected { Outcome::Tp } else { Outcome::Fn },
            subject_src: src.clone(),
            subject_dst: Some(dst.clone()),
            mapped_src: src_mapped.map(str::to_string),
            mapped_dst: dst_mapped.map(str::to_string),
        });
    }
}

/// Edges only the patch introduced. If the candidate already wires the
/// conserved endpoints the same way, the fix signature does not reliably
/// indicate a fix there, which counts as a false positive. Every other
/// case is a true negative: no historical evidence of the fix-only edge.
fn score_added_edges(
    verdicts: &mut Vec<Verdict>,
    signature_edges: &EdgeClasses,
    patched: &Cfg,
    candidate: &Cfg,
    forward: &GraphDiff,
) {
    for edge in &signature_edges.added {
        let EdgeRecord { src, dst, .. } = edge;
        let src_mapped = conserved_match(forward, patched, candidate, src);
        let dst_mapped = conserved_match(forward, patched, candidate, dst);

        let outcome = match (src_mapped, dst_mapped) {
            (Some(s), Some(d)) if candidate.has_edge(s, d) => Outcome::Fp,
            _ => Outcome::Tn,
        };

        verdicts.push(Verdict {
            kind: SubjectKind::Edge,
            direction: Direction::Forward,
            outcome,
            subject_src: src.clone(),
            subject_dst: Some(dst.clone()),
            mapped_src: forward.match_backward(src).map(str::to_string),
            mapped_dst: forward.match_backward(dst).map(str::to_string),
        });
    }
}
