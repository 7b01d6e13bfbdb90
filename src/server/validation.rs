//! Production configuration validation
//!
//! Security checks for production deployments.

use super::config::AppConfig;
use super::loader::environment_name;
use tracing::warn;

/// Warnings raised for `config` in production
pub fn production_warnings(config: &AppConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.server.host == "0.0.0.0" {
        warnings.push(
            "Server is binding to all interfaces (0.0.0.0) in production. \
             Consider binding to 127.0.0.1 and using a reverse proxy."
                .to_string(),
        );
    }

    if config.server.cors_origins.is_empty() {
        warnings.push(
            "CORS allows any origin in production. \
             Set [server] cors_origins to the portfolio's domain."
                .to_string(),
        );
    }

    if config.relay.api_key.is_some() {
        warnings.push(
            "Relay API key is set in a config file. \
             Prefer the environment so the key stays out of version control."
                .to_string(),
        );
    }

    warnings
}

/// Validate configuration for production security
pub fn validate_production_config(config: &AppConfig) {
    if !environment_name().eq_ignore_ascii_case("production") {
        return;
    }

    for warning in production_warnings(config) {
        warn!("SECURITY WARNING: {}", warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_only_warn_about_cors() {
        let warnings = production_warnings(&AppConfig::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("CORS"));
    }

    #[test]
    fn test_exposed_host_and_inline_key_warn() {
        let mut config = AppConfig::default();
        config.server.host = "0.0.0.0".to_string();
        config.server.cors_origins = vec!["https://folio.example".to_string()];
        config.relay.api_key = Some("gsk_inline".to_string());

        let warnings = production_warnings(&config);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("0.0.0.0"));
        assert!(warnings[1].contains("API key"));
    }
}
