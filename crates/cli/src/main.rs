use clap::Parser;
use relict_cli::commands::{Cmd, Command};

/// Relict CLI
///
/// Relict scores whether a historical build of a function still contains a
/// vulnerability that a later patch fixed, by diffing per-function control
/// flow graphs across a known-vulnerable version, a known-patched version,
/// and arbitrary historical candidates.
#[derive(Parser)]
#[command(name = "relict")]
#[command(about = "Relict: cross-version CFG patch-presence analysis")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

/// Runs the Relict CLI with the provided arguments.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .without_time()
        .init();

    let cli = Cli::parse();
    cli.command.execute().await
}
