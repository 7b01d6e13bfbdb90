//! Error types for folio-relay

use thiserror::Error;

/// Relay error type
#[derive(Debug, Error)]
pub enum Error {
    /// No credential could be resolved from any source
    #[error("credential not configured: {0}")]
    ConfigurationMissing(String),

    /// The upstream provider answered with an error payload
    #[error("upstream rejected request: {0}")]
    UpstreamRejected(String),

    /// Network failure or undecodable upstream reply
    #[error("transport fault: {0}")]
    Transport(String),

    /// A credential source could not be read
    #[error("credential source error: {0}")]
    Source(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
