//! Folio Relay - chat proxy for the portfolio assistant
//!
//! This crate forwards visitor chat messages to an upstream
//! chat-completion provider:
//! - Credential: ordered, first-match-wins key resolution (config, env, dotenv files)
//! - Provider: upstream trait and the Groq (OpenAI-compatible) implementation
//! - Persona: the fixed system prompt
//! - Relay: one request in, one normalized [`ChatResponse`] out

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod credential;
pub mod error;
pub mod groq;
pub mod message;
pub mod persona;
pub mod provider;
pub mod relay;
pub mod util;

pub use credential::{
    ConfiguredValue, CredentialResolver, CredentialSource, DotenvFileSource, EnvSource,
    ResolvedCredential, SecureString, DEFAULT_FALLBACK_FILES, DEFAULT_KEY_NAME,
};
pub use error::{Error, Result};
pub use groq::{GroqConfig, GroqProvider};
pub use message::{ChatRequest, ConversationMessage, Role};
pub use persona::{load_persona, DOSSIER_GUARDIAN};
pub use provider::{ChatProvider, PromptRole, UpstreamMessage, UpstreamRequest};
pub use relay::{ChatRelay, ChatResponse, STATUS_CLIENT_ERROR, STATUS_OK, STATUS_SERVER_ERROR};
