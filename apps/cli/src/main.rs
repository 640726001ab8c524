//! scout CLI: batch company research.
//!
//! Researches each company through public web sources and a local
//! text-generation model, saves a JSON report per company and prints a
//! condensed summary.

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
