//! paramexport CLI — Jenkins parameter definition exporter.
//!
//! Walks a Jenkins folder tree, normalizes every job's build parameters,
//! and writes a consolidated JSON schema.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
