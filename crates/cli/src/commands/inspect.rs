//! Parses a single per-function CFG file and reports its blocks: SSA id,
//! BFS level, degrees, and the op-type projection the matcher operates on.

use async_trait::async_trait;
use clap::Args;
use relict_core::load_cfg;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;

/// Arguments for the `inspect` subcommand.
#[derive(Args)]
pub struct InspectArgs {
    /// Path to a per-function CFG file.
    pub input: PathBuf,
    /// Emit machine-readable JSON instead of the text report.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct BlockReport<'a> {
    name: &'a str,
    ssa_id: i64,
    level: Option<u32>,
    in_degree: usize,
    out_degree: usize,
    op_types: &'a [String],
}

/// Executes the `inspect` subcommand.
#[async_trait]
impl super::Command for InspectArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let cfg = load_cfg(&self.input)?;

        let blocks: Vec<BlockReport> = cfg
            .node_indices()
            .filter_map(|idx| cfg.vertex_at(idx).map(|v| (idx, v)))
            .map(|(idx, v)| BlockReport {
                name: &v.name,
                ssa_id: v.ssa_id,
                level: v.level,
                in_degree: cfg.in_degree(idx),
                out_degree: cfg.out_degree(idx),
                op_types: &v.op_types,
            })
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&blocks)?);
            return Ok(());
        }

        println!(
            "{} blocks, {} edges, depth {}",
            cfg.vertex_count(),
            cfg.edge_count(),
            cfg.max_level()
        );
        for b in &blocks {
            let level = b
                .level
                .map(|l| l.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{} (ssa {}, level {}, in {}, out {})",
                b.name, b.ssa_id, level, b.in_degree, b.out_degree
            );
            for op in b.op_types {
                println!("    {op}");
            }
        }
        Ok(())
    }
}
