//! Chat relay endpoint
//!
//! `POST /api/chat` takes `{ message, history? }` and answers with either
//! `{ text }` or `{ error, details? }`.

use axum::extract::rejection::JsonRejection;
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use folio_relay::{ChatRelay, ChatRequest, ChatResponse};
use std::sync::Arc;
use tracing::warn;

async fn chat(
    Extension(relay): Extension<Arc<ChatRelay>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> (StatusCode, Json<ChatResponse>) {
    let response = match payload {
        Ok(Json(request)) => relay.relay(request).await,
        Err(rejection) => {
            warn!(status = %rejection.status(), "Rejected chat request body");
            ChatResponse::malformed(rejection.body_text())
        }
    };

    let status =
        StatusCode::from_u16(response.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response))
}

/// Chat routes
pub fn chat_routes() -> Router {
    Router::new().route("/api/chat", post(chat))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use folio_relay::{
        ChatProvider, ConfiguredValue, CredentialResolver, Error, Result, UpstreamRequest,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    struct FakeProvider {
        calls: AtomicUsize,
        outcome: fn() -> Result<String>,
    }

    #[async_trait]
    impl ChatProvider for FakeProvider {
        fn name(&self) -> &str {
            "fake"
        }

        fn model(&self) -> &str {
            "fake-model"
        }

        async fn complete(&self, _request: UpstreamRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcome)()
        }
    }

    fn app(key: Option<&str>, outcome: fn() -> Result<String>) -> (Router, Arc<FakeProvider>) {
        let provider = Arc::new(FakeProvider {
            calls: AtomicUsize::new(0),
            outcome,
        });
        let resolver = CredentialResolver::new("FOLIO_TEST_CHAT_ROUTE_KEY")
            .with_source(ConfiguredValue::new(key.map(str::to_string)));
        let relay = Arc::new(ChatRelay::new(resolver, provider.clone()));
        (chat_routes().layer(Extension(relay)), provider)
    }

    async fn post_chat(app: Router, body: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_reply_is_returned_as_text() {
        let (app, provider) = app(Some("gsk_route_test_key"), || {
            Ok("I guard the dossier.".to_string())
        });
        let (status, json) = post_chat(app, r#"{"message":"who are you?"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({ "text": "I guard the dossier." }));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_key_is_500_without_upstream_call() {
        let (app, provider) = app(None, || Ok("unreachable".to_string()));
        let (status, json) = post_chat(app, r#"{"message":"hi","history":[]}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Missing Groq API Key");
        assert!(json["details"]
            .as_str()
            .unwrap()
            .contains("not found in environment or dossiers (.env)."));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_upstream_rejection_is_400_with_message() {
        let (app, _) = app(Some("gsk_route_test_key"), || {
            Err(Error::UpstreamRejected("Invalid API Key".to_string()))
        });
        let (status, json) = post_chat(app, r#"{"message":"hi"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, serde_json::json!({ "error": "Invalid API Key" }));
    }

    #[tokio::test]
    async fn test_transport_failure_is_500_data_fault() {
        let (app, _) = app(Some("gsk_route_test_key"), || {
            Err(Error::Transport("connection reset".to_string()))
        });
        let (status, json) = post_chat(app, r#"{"message":"hi"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Guardian Data Fault");
        assert_eq!(json["details"], "connection reset");
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let (app, provider) = app(Some("gsk_route_test_key"), || Ok(String::new()));
        let (status, json) = post_chat(app, r#"{"history":[]}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Malformed Request");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}
