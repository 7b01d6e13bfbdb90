//! Server initialization and main run loop
//!
//! Contains the main `run()` function that starts the HTTP server.

use super::config::{AppConfig, ServerConfig};
use super::loader::load_config;
use super::providers::build_relay;
use super::shutdown::wait_for_shutdown_signal;
use super::validation::validate_production_config;
use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::{Extension, Router};
use folio_relay::ChatRelay;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Command-line overrides for `folio serve`
#[derive(Debug, Default, Clone)]
pub struct ServeOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl ServeOverrides {
    fn apply(self, config: &mut AppConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

/// CORS layer for the configured origins; any origin when none are listed
fn cors_layer(server: &ServerConfig) -> Result<CorsLayer> {
    if server.cors_origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let origins = server
        .cors_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("Invalid CORS origin: {}", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]))
}

/// Build the router with all endpoints and layers
fn build_app(server: &ServerConfig, relay: Arc<ChatRelay>) -> Result<Router> {
    Ok(Router::new()
        .merge(crate::api::health_routes())
        .merge(crate::api::api_router())
        .layer(Extension(relay))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(server)?))
}

/// Run the server
pub async fn run(overrides: ServeOverrides) -> Result<()> {
    info!("Starting Folio v{}", env!("CARGO_PKG_VERSION"));

    let mut config = load_config().context("Failed to load configuration")?;
    overrides.apply(&mut config);
    info!("Configuration loaded");

    validate_production_config(&config);

    let relay = Arc::new(build_relay(&config.relay)?);
    let app = build_app(&config.server, relay)?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Folio shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_config_values() {
        let mut config = AppConfig::default();
        ServeOverrides {
            host: Some("0.0.0.0".to_string()),
            port: None,
        }
        .apply(&mut config);

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_invalid_cors_origin_is_rejected() {
        let server = ServerConfig {
            cors_origins: vec!["https://ok.example".to_string(), "bad\norigin".to_string()],
            ..ServerConfig::default()
        };
        assert!(cors_layer(&server).is_err());
    }
}
