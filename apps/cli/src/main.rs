//! quotelane CLI — render and inspect content from the backend content API.
//!
//! Fetches blog posts, FAQs, insurer reviews, and static pages, runs their
//! bodies through the rendering pipeline, and prints display-ready HTML or
//! human-readable listings.

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
