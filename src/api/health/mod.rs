//! Health API Module

use axum::{Json, Router, routing::get};
use serde_json::json;

use crate::core::ServerState;

/// Health router
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "storefront-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
