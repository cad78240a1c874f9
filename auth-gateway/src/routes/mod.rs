pub mod anonymous;
pub mod users;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::extractors::CurrentPrincipal;
use crate::state::AuthGateway;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn me(CurrentPrincipal(principal): CurrentPrincipal) -> Json<auth_identity::Principal> {
    Json(principal)
}

/// Routes for any authenticated principal
pub fn authenticated_router(gateway: &AuthGateway) -> Router<AuthGateway> {
    gateway.protect(Router::new().route("/me", get(me)))
}

pub fn health_router() -> Router<AuthGateway> {
    Router::new().route("/health", get(health))
}
