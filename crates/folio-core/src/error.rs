//! Error types for folio-core

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Track name not recognised
    #[error("unknown track: {0} (expected `tech` or `space`)")]
    UnknownTrack(String),

    /// A mounted collaborator ended without signalling completion
    #[error("collaborator for {0} ended without completing")]
    Abandoned(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
