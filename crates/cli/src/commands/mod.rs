use async_trait::async_trait;
use clap::Subcommand;
use std::error::Error;

pub mod classify;
pub mod diff;
pub mod inspect;

/// CLI subcommands for Relict.
#[derive(Subcommand)]
pub enum Cmd {
    /// Parse one CFG file and report its blocks, levels, and projections.
    Inspect(inspect::InspectArgs),
    /// Diff two versions of a function: correspondence plus edge sets.
    Diff(diff::DiffArgs),
    /// Score historical candidates against a vulnerable/patched pair.
    Classify(classify::ClassifyArgs),
}

/// Trait for executing CLI subcommands.
///
/// Implementors define the logic for ingesting CFG inputs and producing
/// output (block reports, diff exports, or classification verdicts).
#[async_trait]
pub trait Command {
    /// Executes the subcommand.
    ///
    /// # Returns
    /// A `Result` indicating success or an error if execution fails.
    async fn execute(self) -> Result<(), Box<dyn Error>>;
}

#[async_trait]
impl Command for Cmd {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        match self {
            Cmd::Inspect(args) => args.execute().await,
            Cmd::Diff(args) => args.execute().await,
            Cmd::Classify(args) => args.execute().await,
        }
    }
}
