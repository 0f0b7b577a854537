//! Batch cross-version classification: scores each historical candidate
//! build of one function against a known-vulnerable / known-patched pair
//! and streams a colored per-element verdict log plus the confusion-matrix
//! summary.

use async_trait::async_trait;
use clap::Args;
use owo_colors::OwoColorize;
use relict_analysis::verdict::{Direction, Outcome, SubjectKind};
use relict_analysis::{Classification, Summary, Verdict, Weights, classify_candidate};
use relict_core::load_cfg;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;

/// Arguments for the `classify` subcommand.
#[derive(Args)]
pub struct ClassifyArgs {
    /// Directory holding one subdirectory of CFG files per commit.
    #[arg(long)]
    target_dir: PathBuf,
    /// Function name; resolves to `<target-dir>/<commit>/<function>.cfg`.
    #[arg(long)]
    function: String,
    /// Commit of the known-vulnerable build.
    #[arg(long)]
    vulnerable: String,
    /// Commit of the known-patched build.
    #[arg(long)]
    patched: String,
    /// Candidate commits to score.
    #[arg(required = true)]
    candidates: Vec<String>,
    /// Metric weight override as `instruction,level,in,out`.
    #[arg(long)]
    weights: Option<String>,
    /// Emit machine-readable JSON instead of the colored stream.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct CandidateReport<'a> {
    candidate: &'a str,
    #[serde(flatten)]
    classification: Classification,
}

/// Executes the `classify` subcommand.
#[async_trait]
impl super::Command for ClassifyArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let weights = match &self.weights {
            Some(spec) => Weights::parse(spec)?,
            None => Weights::default().validated()?,
        };

        // The reference pair is non-negotiable; candidates are best-effort.
        let vulnerable = load_cfg(&self.cfg_path(&self.vulnerable))?;
        let patched = load_cfg(&self.cfg_path(&self.patched))?;

        let mut reports = Vec::new();
        for candidate in &self.candidates {
            let cfg = match load_cfg(&self.cfg_path(candidate)) {
                Ok(cfg) => cfg,
                Err(err) => {
                    tracing::warn!(%candidate, %err, "skipping candidate: ingestion failed");
                    continue;
                }
            };
            let classification = classify_candidate(&vulnerable, &patched, &cfg, &weights);

            if self.json {
                reports.push(CandidateReport {
                    candidate,
                    classification,
                });
            } else {
                print_candidate(&self.patched, &self.vulnerable, candidate, &classification);
            }
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        Ok(())
    }
}

impl ClassifyArgs {
    fn cfg_path(&self, commit: &str) -> PathBuf {
        self.target_dir
            .join(commit)
            .join(format!("{}.cfg", self.function))
    }
}

fn print_candidate(patched: &str, vulnerable: &str, candidate: &str, result: &Classification) {
    println!(
        "+ {} vs - {} -> ? {}",
        patched.green(),
        vulnerable.red(),
        candidate.yellow()
    );
    for verdict in &result.verdicts {
        print_verdict(verdict);
    }
    print_summary(&result.summary);
    println!();
}

fn print_verdict(v: &Verdict) {
    let tag = match (v.kind, v.direction) {
        (SubjectKind::Vertex, _) => "[DEL VERT]",
        (SubjectKind::Edge, Direction::Backward) => "[DEL EDGE]",
        (SubjectKind::Edge, Direction::Forward) => "[NEW EDGE]",
    };
    let subject = match &v.subject_dst {
        Some(dst) => format!("{} -> {}", v.subject_src, dst),
        None => v.subject_src.clone(),
    };
    let mapped = match (&v.mapped_src, &v.mapped_dst) {
        (Some(src), Some(dst)) => format!("{src} -> {dst}"),
        (Some(src), None) => src.clone(),
        _ => "?".to_string(),
    };

    // A hit on the vulnerable signature (tp) and a miss on the fix-only
    // signature (tn) are both the expected outcome; color them green.
    let line = match v.outcome {
        Outcome::Tp | Outcome::Tn => {
            format!("{tag} \u{2705} [{subject}] => [{mapped}]").green().to_string()
        }
        Outcome::Fp | Outcome::Fn => {
            format!("{tag} \u{274c} [{subject}] => [{mapped}]").red().to_string()
        }
    };
    println!("{line}");
}

fn print_summary(s: &Summary) {
    let fmt = |r: Option<f64>| match r {
        Some(v) => format!("{v:.2}"),
        None => "n/a".to_string(),
    };
    println!("TP {:>3} | FP {:>3} | ACCURC {}", s.tp, s.fp, fmt(s.accuracy));
    println!(
        "FN {:>3} | TN {:>3} | RECALL {} PRECIS {}",
        s.fneg,
        s.tn,
        fmt(s.recall),
        fmt(s.precision)
    );
}
