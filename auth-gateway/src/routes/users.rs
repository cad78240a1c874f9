//! User administration, admin principals only

use auth_identity::Principal;
use axum::{
    extract::State,
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use logger_redacted::redact;
use serde::Deserialize;

use crate::admin::require_admin;
use crate::error::ApiError;
use crate::extractors::{CurrentPrincipal, ValidatedJson};
use crate::state::AuthGateway;
use crate::validation::RequestValidation;
use crate::{validate_email, validate_required};

#[derive(Debug, Deserialize)]
pub struct AddUserRequest {
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl RequestValidation for AddUserRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.email, "Email is required");
        validate_email!(self.email, "Invalid email format");
        Ok(())
    }
}

async fn list_users(State(gateway): State<AuthGateway>) -> Result<Json<Vec<Principal>>, ApiError> {
    gateway
        .service()
        .list()
        .await
        .map(Json)
        .map_err(|err| ApiError::from_domain(&err, gateway.policy()))
}

async fn add_user(
    State(gateway): State<AuthGateway>,
    CurrentPrincipal(admin): CurrentPrincipal,
    ValidatedJson(body): ValidatedJson<AddUserRequest>,
) -> Result<Json<Principal>, ApiError> {
    let user = gateway
        .service()
        .provision(&body.email, body.is_admin)
        .await
        .map_err(|err| ApiError::from_domain(&err, gateway.policy()))?;

    tracing::info!(
        admin_id = %admin.id,
        user_id = %user.id,
        email = %redact(&user.email),
        "Admin added user"
    );
    Ok(Json(user))
}

/// `/users` routes, behind the full authentication chain and the admin gate
pub fn router(gateway: &AuthGateway) -> Router<AuthGateway> {
    let routes = Router::new()
        .route("/users", get(list_users).post(add_user))
        .route_layer(from_fn_with_state(gateway.clone(), require_admin));

    gateway.protect(routes)
}
