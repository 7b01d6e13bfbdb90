//! Server configuration types
//!
//! Contains all configuration structures for the Folio server.

use folio_core::Timings;
use folio_relay::{DEFAULT_FALLBACK_FILES, DEFAULT_KEY_NAME};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub experience: ExperienceConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins; empty allows any
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Chat relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Explicit key, checked before the environment
    #[serde(default)]
    pub api_key: Option<String>,
    /// Variable name looked up in the environment and fallback files
    #[serde(default = "default_key_name")]
    pub key_name: String,
    /// Dotenv-style files scanned in order when the environment has no key
    #[serde(default = "default_fallback_files")]
    pub fallback_files: Vec<PathBuf>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Upstream request timeout; unset means none
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Replaces the built-in persona prompt when readable
    #[serde(default)]
    pub persona_file: Option<PathBuf>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            key_name: default_key_name(),
            fallback_files: default_fallback_files(),
            api_base: default_api_base(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: None,
            persona_file: None,
        }
    }
}

fn default_key_name() -> String {
    DEFAULT_KEY_NAME.to_string()
}

fn default_fallback_files() -> Vec<PathBuf> {
    DEFAULT_FALLBACK_FILES.iter().map(PathBuf::from).collect()
}

fn default_api_base() -> String {
    folio_relay::groq::GROQ_API_BASE.to_string()
}

fn default_model() -> String {
    folio_relay::groq::DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    folio_relay::groq::DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    folio_relay::groq::DEFAULT_MAX_TOKENS
}

/// Experience timings, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceConfig {
    #[serde(default = "default_boot_log_interval_ms")]
    pub boot_log_interval_ms: u64,
    #[serde(default = "default_boot_settle_ms")]
    pub boot_settle_ms: u64,
    #[serde(default = "default_entry_delay_ms")]
    pub entry_delay_ms: u64,
    #[serde(default = "default_warp_tick_ms")]
    pub warp_tick_ms: u64,
}

impl Default for ExperienceConfig {
    fn default() -> Self {
        Self {
            boot_log_interval_ms: default_boot_log_interval_ms(),
            boot_settle_ms: default_boot_settle_ms(),
            entry_delay_ms: default_entry_delay_ms(),
            warp_tick_ms: default_warp_tick_ms(),
        }
    }
}

impl ExperienceConfig {
    /// Collaborator timings
    pub fn timings(&self) -> Timings {
        Timings {
            boot_log_interval: Duration::from_millis(self.boot_log_interval_ms),
            boot_settle: Duration::from_millis(self.boot_settle_ms),
            entry_delay: Duration::from_millis(self.entry_delay_ms),
            warp_tick: Duration::from_millis(self.warp_tick_ms),
        }
    }
}

fn default_boot_log_interval_ms() -> u64 {
    400
}
fn default_boot_settle_ms() -> u64 {
    1000
}
fn default_entry_delay_ms() -> u64 {
    1500
}
fn default_warp_tick_ms() -> u64 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::loader::DEFAULT_CONFIG;
    use config::{Config, File, FileFormat};

    #[test]
    fn test_embedded_defaults_match_struct_defaults() {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        let defaults = AppConfig::default();
        assert_eq!(config.server.port, defaults.server.port);
        assert_eq!(config.relay.key_name, "GROQ_API_KEY");
        assert_eq!(
            config.relay.fallback_files,
            vec![PathBuf::from(".env.local"), PathBuf::from(".env")]
        );
        assert_eq!(config.relay.model, defaults.relay.model);
        assert_eq!(config.relay.max_tokens, 1000);
        assert!(config.relay.api_key.is_none());
        assert!(config.relay.timeout_secs.is_none());
        assert_eq!(config.experience.warp_tick_ms, 100);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(
                "[relay]\nmodel = \"mixtral-8x7b-32768\"\n",
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.relay.model, "mixtral-8x7b-32768");
        assert_eq!(config.relay.key_name, DEFAULT_KEY_NAME);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_timings_conversion() {
        let timings = ExperienceConfig::default().timings();
        assert_eq!(timings.boot_log_interval, Duration::from_millis(400));
        assert_eq!(timings.warp_tick, Duration::from_millis(100));
    }
}
