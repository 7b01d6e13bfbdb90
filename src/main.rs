//! Folio - portfolio backend
//!
//! CLI entry point for the Folio server.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod cli;
mod server;

#[tokio::main]
async fn main() -> Result<()> {
    let preloaded = server::preload_default_dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = cli::Cli::parse();

    match preloaded {
        Ok(names) => debug!(count = names.len(), "Preloaded dotenv variables"),
        Err(e) => warn!("Dotenv files not loaded: {:#}", e),
    }

    cli::run(cli).await
}
