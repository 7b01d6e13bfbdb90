//! Relay construction
//!
//! Builds the chat relay from configuration: credential sources, upstream
//! provider, persona prompt.

use super::config::RelayConfig;
use anyhow::{Context, Result};
use folio_relay::{load_persona, ChatRelay, CredentialResolver, GroqConfig, GroqProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Build the relay described by `relay_config`
pub fn build_relay(relay_config: &RelayConfig) -> Result<ChatRelay> {
    let resolver = CredentialResolver::standard(
        relay_config.key_name.clone(),
        relay_config.api_key.clone(),
        &relay_config.fallback_files,
    );

    let mut groq = GroqConfig::new()
        .with_base_url(relay_config.api_base.clone())
        .with_model(relay_config.model.clone())
        .with_temperature(relay_config.temperature)
        .with_max_tokens(relay_config.max_tokens);
    if let Some(secs) = relay_config.timeout_secs {
        groq = groq.with_timeout(Duration::from_secs(secs));
    }

    let provider = GroqProvider::new(groq).context("Failed to create Groq provider")?;
    info!(
        model = %relay_config.model,
        sources = ?resolver.source_names(),
        "Chat relay configured"
    );

    if resolver.resolve().is_err() {
        warn!(
            key = %relay_config.key_name,
            files = ?relay_config.fallback_files,
            "{} is not set yet; chat requests fail until it is. Run 'folio doctor' to check.",
            relay_config.key_name
        );
    }

    let persona = load_persona(relay_config.persona_file.as_deref());
    Ok(ChatRelay::new(resolver, Arc::new(provider)).with_persona(persona))
}
