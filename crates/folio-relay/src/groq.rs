//! Groq - OpenAI-compatible chat completions
//!
//! The relay sends one `POST /chat/completions` per visitor message. The reply
//! body decides the outcome: an `error` object wins over `choices`, regardless
//! of the HTTP status.

use crate::error::{Error, Result};
use crate::provider::{ChatProvider, UpstreamMessage, UpstreamRequest};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Groq API base URL
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Default Groq model
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.6;

/// Default completion length
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Groq provider configuration
#[derive(Debug, Clone)]
pub struct GroqConfig {
    /// Base URL
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum output tokens
    pub max_tokens: u32,
    /// Request timeout; `None` keeps the HTTP client default
    pub timeout: Option<Duration>,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            base_url: GROQ_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: None,
        }
    }
}

impl GroqConfig {
    /// Create a configuration with the default endpoint and sampling settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the maximum output tokens
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Groq provider (OpenAI-compatible)
pub struct GroqProvider {
    client: Client,
    config: GroqConfig,
}

// OpenAI-compatible request/response types
#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [UpstreamMessage],
    temperature: f32,
    max_tokens: u32,
}

/// Reply body. `choices` stays raw until the `error` field has been checked,
/// so a rejection is honoured whatever `choices` holds.
#[derive(Deserialize)]
struct UpstreamReply {
    #[serde(default)]
    error: Option<UpstreamError>,
    #[serde(default)]
    choices: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UpstreamError {
    Detailed { message: String },
    Plain(String),
    Other(serde_json::Value),
}

impl UpstreamError {
    /// Text surfaced to the visitor. Errors without a message fall back to
    /// their `type`/`code`, then to the raw JSON.
    fn into_message(self) -> String {
        match self {
            Self::Detailed { message } | Self::Plain(message) => message,
            Self::Other(value) => {
                let labels: Vec<String> = ["type", "code"]
                    .iter()
                    .filter_map(|field| value.get(*field))
                    .map(|label| match label.as_str() {
                        Some(text) => text.to_string(),
                        None => label.to_string(),
                    })
                    .collect();
                if labels.is_empty() {
                    value.to_string()
                } else {
                    labels.join(": ")
                }
            }
        }
    }
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Turn an upstream reply body into the reply text or a classified error
pub fn interpret_reply(body: &[u8]) -> Result<String> {
    let reply: UpstreamReply = serde_json::from_slice(body)
        .map_err(|e| Error::Transport(format!("unexpected upstream reply: {}", e)))?;

    if let Some(error) = reply.error {
        return Err(Error::UpstreamRejected(error.into_message()));
    }

    let choices: Vec<Choice> = match reply.choices {
        Some(choices) => serde_json::from_value(choices)
            .map_err(|e| Error::Transport(format!("unexpected upstream choices: {}", e)))?,
        None => Vec::new(),
    };

    choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.unwrap_or_default())
        .ok_or_else(|| Error::Transport("no choices in upstream reply".to_string()))
}

impl GroqProvider {
    /// Create a new Groq provider
    pub fn new(config: GroqConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &GroqConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl ChatProvider for GroqProvider {
    fn name(&self) -> &str {
        "groq"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    #[instrument(skip(self, request), fields(model = %self.config.model, messages = request.messages.len()))]
    async fn complete(&self, request: UpstreamRequest) -> Result<String> {
        let body = CompletionBody {
            model: &self.config.model,
            messages: &request.messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        debug!("Sending request to Groq");

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(request.credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        debug!(%status, bytes = bytes.len(), "Groq replied");
        interpret_reply(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::SecureString;
    use crate::message::ConversationMessage;
    use axum::extract::State;
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::{Arc, Mutex};

    /// Canned upstream that records each request's bearer header and body
    struct FakeGroq {
        status: StatusCode,
        reply: serde_json::Value,
        seen: Mutex<Vec<(Option<String>, serde_json::Value)>>,
    }

    async fn fake_completions(
        State(fake): State<Arc<FakeGroq>>,
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> (StatusCode, Json<serde_json::Value>) {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        fake.seen.lock().unwrap().push((auth, body));
        (fake.status, Json(fake.reply.clone()))
    }

    /// Serve `fake` on an ephemeral port and return its base URL
    async fn serve(fake: Arc<FakeGroq>) -> String {
        let app = Router::new()
            .route("/openai/v1/chat/completions", post(fake_completions))
            .with_state(fake);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/openai/v1/", addr)
    }

    fn request() -> UpstreamRequest {
        UpstreamRequest {
            credential: SecureString::new("gsk_http_test_key_1234"),
            messages: vec![
                UpstreamMessage::system("persona"),
                UpstreamMessage::from(&ConversationMessage::user("who are you?")),
                UpstreamMessage::from(&ConversationMessage::assistant("The guardian.")),
                UpstreamMessage::user("what do you guard?"),
            ],
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = GroqConfig::default();
        assert_eq!(config.base_url, GROQ_API_BASE);
        assert_eq!(config.model, "llama-3.3-70b-versatile");
        assert!((config.temperature - 0.6).abs() < f32::EPSILON);
        assert_eq!(config.max_tokens, 1000);
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = GroqConfig::new()
            .with_model("llama-3.1-8b-instant")
            .with_base_url("http://localhost:9000/v1/")
            .with_max_tokens(64)
            .with_temperature(0.1)
            .with_timeout(Duration::from_secs(30));

        assert_eq!(config.model, "llama-3.1-8b-instant");
        assert_eq!(config.max_tokens, 64);
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(
            config.completions_url(),
            "http://localhost:9000/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let messages = vec![
            UpstreamMessage::system("persona"),
            UpstreamMessage::user("hello"),
        ];
        let body = CompletionBody {
            model: DEFAULT_MODEL,
            messages: &messages,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], DEFAULT_MODEL);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hello");
        assert_eq!(json["max_tokens"], 1000);
    }

    #[test]
    fn test_first_choice_returned_verbatim() {
        let body = br#"{"choices":[
            {"message":{"role":"assistant","content":"  The Subject studies at VIT.\n"}},
            {"message":{"role":"assistant","content":"second"}}
        ]}"#;
        assert_eq!(
            interpret_reply(body).unwrap(),
            "  The Subject studies at VIT.\n"
        );
    }

    #[test]
    fn test_error_payload_wins() {
        let body = br#"{"error":{"message":"Invalid API Key","type":"invalid_request_error"}}"#;
        match interpret_reply(body) {
            Err(Error::UpstreamRejected(msg)) => assert_eq!(msg, "Invalid API Key"),
            _ => panic!("expected UpstreamRejected"),
        }
    }

    #[test]
    fn test_error_payload_ignores_choices() {
        let body = br#"{"error":{"message":"model overloaded"},"choices":"garbage"}"#;
        match interpret_reply(body) {
            Err(Error::UpstreamRejected(msg)) => assert_eq!(msg, "model overloaded"),
            _ => panic!("expected UpstreamRejected"),
        }
    }

    #[test]
    fn test_plain_string_error() {
        let body = br#"{"error":"rate limited"}"#;
        assert!(matches!(
            interpret_reply(body),
            Err(Error::UpstreamRejected(msg)) if msg == "rate limited"
        ));
    }

    #[test]
    fn test_error_without_message_is_still_rejected() {
        let body = br#"{"error":{"type":"invalid_request_error","code":"model_decommissioned"}}"#;
        match interpret_reply(body) {
            Err(Error::UpstreamRejected(msg)) => {
                assert_eq!(msg, "invalid_request_error: model_decommissioned")
            }
            other => panic!("expected UpstreamRejected, got {:?}", other),
        }
    }

    #[test]
    fn test_unlabelled_error_surfaces_raw_json() {
        let body = br#"{"error":{"retry_after":30}}"#;
        assert!(matches!(
            interpret_reply(body),
            Err(Error::UpstreamRejected(msg)) if msg == r#"{"retry_after":30}"#
        ));
    }

    #[test]
    fn test_null_error_reads_choices() {
        let body = br#"{"error":null,"choices":[{"message":{"content":"ok"}}]}"#;
        assert_eq!(interpret_reply(body).unwrap(), "ok");
    }

    #[test]
    fn test_empty_choices_is_transport_fault() {
        assert!(matches!(
            interpret_reply(br#"{"choices":[]}"#),
            Err(Error::Transport(_))
        ));
    }

    #[test]
    fn test_non_json_is_transport_fault() {
        assert!(matches!(
            interpret_reply(b"<html>502 Bad Gateway</html>"),
            Err(Error::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_complete_posts_bearer_and_messages_in_order() {
        let fake = Arc::new(FakeGroq {
            // status is ignored, the body decides
            status: StatusCode::SERVICE_UNAVAILABLE,
            reply: serde_json::json!({
                "choices": [
                    { "message": { "role": "assistant", "content": "  The dossier.\n" } },
                    { "message": { "role": "assistant", "content": "second" } }
                ]
            }),
            seen: Mutex::new(Vec::new()),
        });
        let base_url = serve(fake.clone()).await;
        let provider = GroqProvider::new(
            GroqConfig::new()
                .with_base_url(base_url)
                .with_model("llama-3.1-8b-instant")
                .with_max_tokens(64),
        )
        .unwrap();

        let text = provider.complete(request()).await.unwrap();
        assert_eq!(text, "  The dossier.\n");

        let seen = fake.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (auth, body) = &seen[0];
        assert_eq!(auth.as_deref(), Some("Bearer gsk_http_test_key_1234"));
        assert_eq!(body["model"], "llama-3.1-8b-instant");
        assert_eq!(body["max_tokens"], 64);
        let roles: Vec<&str> = body["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert_eq!(body["messages"][3]["content"], "what do you guard?");
    }

    #[tokio::test]
    async fn test_complete_surfaces_rejection_body() {
        let fake = Arc::new(FakeGroq {
            status: StatusCode::UNAUTHORIZED,
            reply: serde_json::json!({ "error": { "message": "Invalid API Key" } }),
            seen: Mutex::new(Vec::new()),
        });
        let provider =
            GroqProvider::new(GroqConfig::new().with_base_url(serve(fake).await)).unwrap();

        match provider.complete(request()).await {
            Err(Error::UpstreamRejected(msg)) => assert_eq!(msg, "Invalid API Key"),
            other => panic!("expected UpstreamRejected, got {:?}", other),
        }
    }
}
