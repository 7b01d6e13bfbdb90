//! Upstream provider abstraction

use crate::credential::SecureString;
use crate::error::Result;
use crate::message::{ConversationMessage, Role};
use serde::Serialize;

/// Role of a message sent upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    /// Persona instruction
    System,
    /// Visitor message
    User,
    /// Guardian message
    Assistant,
}

impl From<Role> for PromptRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => Self::User,
            Role::Assistant => Self::Assistant,
        }
    }
}

/// A message in the upstream `messages` array
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpstreamMessage {
    /// Message role
    pub role: PromptRole,
    /// Message text
    pub content: String,
}

impl UpstreamMessage {
    /// System message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::System,
            content: content.into(),
        }
    }

    /// Visitor message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            content: content.into(),
        }
    }
}

impl From<&ConversationMessage> for UpstreamMessage {
    fn from(msg: &ConversationMessage) -> Self {
        Self {
            role: msg.role.into(),
            content: msg.content.clone(),
        }
    }
}

/// One upstream call: the resolved credential and the full prompt
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    /// Bearer credential for this call
    pub credential: SecureString,
    /// System persona, history, then the new visitor message
    pub messages: Vec<UpstreamMessage>,
}

/// Trait for chat-completion providers
#[async_trait::async_trait]
pub trait ChatProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Get the model used for completions
    fn model(&self) -> &str;

    /// Send one completion request and return the reply text
    async fn complete(&self, request: UpstreamRequest) -> Result<String>;
}
