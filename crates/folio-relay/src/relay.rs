//! The chat relay: resolve a credential, forward one request, normalize the reply

use crate::credential::CredentialResolver;
use crate::error::Error;
use crate::message::ChatRequest;
use crate::persona::DOSSIER_GUARDIAN;
use crate::provider::{ChatProvider, UpstreamMessage, UpstreamRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Status returned alongside a successful reply
pub const STATUS_OK: u16 = 200;

/// Status for upstream-reported and malformed-request errors
pub const STATUS_CLIENT_ERROR: u16 = 400;

/// Status for configuration and transport faults
pub const STATUS_SERVER_ERROR: u16 = 500;

/// Normalized relay outcome.
///
/// Serializes to `{ "text": ... }` or `{ "error": ..., "details"?: ... }`.
/// The status code travels with the value but is not part of the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatResponse {
    /// Upstream reply text
    Reply {
        /// First choice content, verbatim
        text: String,
    },
    /// Any failure
    Failure {
        /// HTTP status to answer with
        #[serde(skip)]
        status: u16,
        /// Short error label or the upstream message
        error: String,
        /// Extra explanation
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
}

impl ChatResponse {
    /// Successful reply
    #[must_use]
    pub fn reply(text: impl Into<String>) -> Self {
        Self::Reply { text: text.into() }
    }

    /// The request body could not be parsed
    #[must_use]
    pub fn malformed(details: impl Into<String>) -> Self {
        Self::Failure {
            status: STATUS_CLIENT_ERROR,
            error: "Malformed Request".to_string(),
            details: Some(details.into()),
        }
    }

    /// Map a relay error to its response
    #[must_use]
    pub fn from_error(error: Error) -> Self {
        match error {
            Error::ConfigurationMissing(detail) => Self::Failure {
                status: STATUS_SERVER_ERROR,
                error: "Missing Groq API Key".to_string(),
                details: Some(format!(
                    "The Dossier Guardian cannot initialize. {}",
                    detail
                )),
            },
            Error::UpstreamRejected(message) => Self::Failure {
                status: STATUS_CLIENT_ERROR,
                error: message,
                details: None,
            },
            Error::Transport(message) | Error::Source(message) => Self::Failure {
                status: STATUS_SERVER_ERROR,
                error: "Guardian Data Fault".to_string(),
                details: Some(message),
            },
        }
    }

    /// HTTP status for this outcome
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Reply { .. } => STATUS_OK,
            Self::Failure { status, .. } => *status,
        }
    }

    /// Whether this is a reply
    #[must_use]
    pub fn is_reply(&self) -> bool {
        matches!(self, Self::Reply { .. })
    }
}

/// Stateless chat relay shared by all requests
pub struct ChatRelay {
    resolver: CredentialResolver,
    provider: Arc<dyn ChatProvider>,
    persona: String,
}

impl ChatRelay {
    /// Create a relay using the default persona
    #[must_use]
    pub fn new(resolver: CredentialResolver, provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            resolver,
            provider,
            persona: DOSSIER_GUARDIAN.to_string(),
        }
    }

    /// Replace the persona prompt
    #[must_use]
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    /// Active persona prompt
    #[must_use]
    pub fn persona(&self) -> &str {
        &self.persona
    }

    /// Upstream provider
    #[must_use]
    pub fn provider(&self) -> &Arc<dyn ChatProvider> {
        &self.provider
    }

    /// Build the upstream prompt: persona, history, then the new message
    #[must_use]
    pub fn compose(&self, request: &ChatRequest) -> Vec<UpstreamMessage> {
        let mut messages = Vec::with_capacity(request.history.len() + 2);
        messages.push(UpstreamMessage::system(self.persona.as_str()));
        messages.extend(request.history.iter().map(UpstreamMessage::from));
        messages.push(UpstreamMessage::user(request.message.as_str()));
        messages
    }

    /// Relay one request. Never fails: every error becomes a [`ChatResponse::Failure`].
    #[instrument(skip_all, fields(provider = %self.provider.name(), history = request.history.len()))]
    pub async fn relay(&self, request: ChatRequest) -> ChatResponse {
        let resolved = match self.resolver.resolve() {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(error = %e, "Relay cannot start without a credential");
                return ChatResponse::from_error(e);
            }
        };

        let upstream = UpstreamRequest {
            credential: resolved.secret,
            messages: self.compose(&request),
        };

        match self.provider.complete(upstream).await {
            Ok(text) => {
                info!(source = %resolved.source, "Relayed chat reply");
                ChatResponse::reply(text)
            }
            Err(e) => {
                warn!(error = %e, "Relay failed");
                ChatResponse::from_error(e)
            }
        }
    }
}
