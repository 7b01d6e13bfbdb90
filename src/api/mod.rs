//! Web API module for Folio
//!
//! Provides REST API endpoints for:
//! - Chat relay (`POST /api/chat`)
//! - Health check (`GET /health`)

pub mod chat;
pub mod health;

use axum::Router;

pub use chat::chat_routes;
pub use health::health_routes;

/// Create the API router with all endpoints
pub fn api_router() -> Router {
    Router::new().merge(chat_routes())
}
