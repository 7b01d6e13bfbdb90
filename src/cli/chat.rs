//! Terminal chat client
//!
//! Reads visitor lines from stdin, posts them to `/api/chat` and prints the
//! guardian's answers. Uses the same session rules as the web widget.

use crate::server::load_config;
use anyhow::{Context, Result};
use folio_core::ChatSession;
use folio_relay::{ChatRequest, ChatResponse};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

const GREETING: &str = "Dossier Guardian online. Ask about the dossier, or type /quit.";

/// Base URL from the flag or the configured server address
fn base_url(url: Option<String>) -> Result<String> {
    match url {
        Some(url) => Ok(url.trim_end_matches('/').to_string()),
        None => {
            let config = load_config().context("Failed to load configuration")?;
            Ok(format!("http://{}:{}", config.server.host, config.server.port))
        }
    }
}

async fn send(
    client: &reqwest::Client,
    endpoint: &str,
    request: &ChatRequest,
) -> reqwest::Result<ChatResponse> {
    let response = client.post(endpoint).json(request).send().await?;
    debug!(status = %response.status(), "Chat response received");
    response.json::<ChatResponse>().await
}

pub async fn run(url: Option<String>) -> Result<()> {
    let endpoint = format!("{}/api/chat", base_url(url)?);
    let client = reqwest::Client::new();
    let mut session = ChatSession::new();

    println!("{}\n", GREETING);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim() == "/quit" {
            break;
        }

        let Some(request) = session.begin(&line) else {
            continue;
        };

        match send(&client, &endpoint, &request).await {
            Ok(response) => session.finish(response),
            Err(e) => {
                debug!("Chat request failed: {}", e);
                session.sever();
            }
        }

        if let Some(entry) = session.transcript().last() {
            println!("\n{}\n", entry.content);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let url = base_url(Some("http://localhost:3000/".to_string())).unwrap();
        assert_eq!(url, "http://localhost:3000");
    }
}
