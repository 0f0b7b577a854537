//! Diffs two versions of one function's CFG and exports the full
//! correspondence: same/different vertex pairs, the forward table, and the
//! conserved/deleted/added edge sets. The JSON form is the input contract
//! of the downstream diagram-rendering collaborator.

use async_trait::async_trait;
use clap::Args;
use owo_colors::OwoColorize;
use relict_analysis::{EdgeClasses, GraphDiff, Weights, classify_edges, match_graphs};
use relict_core::{Cfg, load_cfg};
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;

/// Arguments for the `diff` subcommand.
#[derive(Args)]
pub struct DiffArgs {
    /// CFG file of the older version.
    pub old: PathBuf,
    /// CFG file of the newer version.
    pub new: PathBuf,
    /// Metric weight override as `instruction,level,in,out`.
    #[arg(long)]
    weights: Option<String>,
    /// Emit machine-readable JSON instead of the text report.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct DiffExport<'a> {
    #[serde(flatten)]
    correspondence: &'a GraphDiff,
    #[serde(flatten)]
    edges: &'a EdgeClasses,
}

/// Executes the `diff` subcommand.
#[async_trait]
impl super::Command for DiffArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let weights = match &self.weights {
            Some(spec) => Weights::parse(spec)?,
            None => Weights::default().validated()?,
        };

        let old = load_cfg(&self.old)?;
        let new = load_cfg(&self.new)?;

        let diff = match_graphs(&old, &new, &weights);
        let edges = classify_edges(&old, &new, &diff);

        if self.json {
            let export = DiffExport {
                correspondence: &diff,
                edges: &edges,
            };
            println!("{}", serde_json::to_string_pretty(&export)?);
            return Ok(());
        }

        print_report(&old, &new, &diff, &edges);
        Ok(())
    }
}

/// Prints the human-readable diff report.
fn print_report(old: &Cfg, new: &Cfg, diff: &GraphDiff, edges: &EdgeClasses) {
    println!(
        "matched {} pairs (total cost {:.4}): {} same, {} different",
        diff.same.len() + diff.diff.len(),
        diff.total_cost,
        diff.same.len(),
        diff.diff.len()
    );

    let deleted: Vec<&str> = diff
        .diff
        .iter()
        .filter(|p| !p.old.is_padding())
        .map(|p| p.old.name.as_str())
        .collect();
    let added: Vec<&str> = diff
        .diff
        .iter()
        .filter(|p| !p.new.is_padding())
        .map(|p| p.new.name.as_str())
        .collect();

    println!("{}", "deleted vertices:".red().bold());
    print_vertex_context(old, &deleted);

    println!("{}", "added vertices:".green().bold());
    print_vertex_context(new, &added);

    println!("{}", "conserved edges:".bold());
    for (e_old, e_new) in &edges.conserved {
        println!(
            "    ({} -> {}) => ({} -> {})",
            e_old.src, e_old.dst, e_new.src, e_new.dst
        );
    }
    println!("{}", "deleted edges:".red().bold());
    for e in &edges.deleted {
        println!("    {} -> {}", e.src, e.dst);
    }
    println!("{}", "added edges:".green().bold());
    for e in &edges.added {
        println!("    {} -> {}", e.src, e.dst);
    }
}

/// Lists each vertex with its neighbours, marking neighbours that are
/// themselves in the changed set: a changed vertex whose neighbour also
/// changed is a strong signal the whole region was rewritten.
fn print_vertex_context(graph: &Cfg, changed: &[&str]) {
    for name in changed {
        println!("  {name}");
        for suc in graph.successors(name) {
            if changed.contains(&suc) {
                println!("    -> {suc} {}", "STRONG MATCH".bold());
            } else {
                println!("    -> {suc}");
            }
        }
        for pred in graph.predecessors(name) {
            if changed.contains(&pred) {
                println!("    <- {pred} {}", "STRONG MATCH".bold());
            } else {
                println!("    <- {pred}");
            }
        }
    }
}
