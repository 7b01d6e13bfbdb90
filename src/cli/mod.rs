//! CLI module for Folio
//!
//! Provides commands:
//! - `serve`: Start the HTTP server
//! - `chat`: Terminal chat client against a running server
//! - `tour`: Walk a track through the experience phases
//! - `doctor`: Configuration diagnostics

use clap::{Parser, Subcommand};

pub mod chat;
pub mod doctor;
pub mod tour;

/// Folio portfolio backend CLI
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "Portfolio backend with the Dossier Guardian chat relay")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Chat with the Dossier Guardian through a running server
    Chat {
        /// Server base URL (defaults to the configured host and port)
        #[arg(long)]
        url: Option<String>,
    },
    /// Walk a track through its phases
    Tour {
        /// `tech` or `space`
        track: String,
        /// Go back to the landing view after this many milliseconds
        #[arg(long)]
        back_after_ms: Option<u64>,
    },
    /// Check configuration and credential resolution
    Doctor,
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Serve { host, port }) => {
            crate::server::run(crate::server::ServeOverrides { host, port }).await
        }
        Some(Commands::Chat { url }) => chat::run(url).await,
        Some(Commands::Tour {
            track,
            back_after_ms,
        }) => tour::run(&track, back_after_ms).await,
        Some(Commands::Doctor) => doctor::run().await,
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}
