//! PhoneSpec CLI: phone spec extraction and price reconciliation.
//!
//! Looks phones up on spec catalogues, normalizes them into device drafts
//! with RAM × storage variants, and summarizes marketplace prices.

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
