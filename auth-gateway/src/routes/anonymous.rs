//! Registration and login, open to unauthenticated clients

use auth_identity::{IdentityError, Principal};
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::extractors::ValidatedJson;
use crate::state::AuthGateway;
use crate::validation::RequestValidation;
use crate::{validate_email, validate_required};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

impl RequestValidation for RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.email, "Email is required");
        validate_email!(self.email, "Invalid email format");
        validate_required!(self.password, "Password is required");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl RequestValidation for LoginRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.email, "Email is required");
        validate_required!(self.password, "Password is required");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct MagicLoginRequest {
    pub email: String,
    pub token: String,
}

impl RequestValidation for MagicLoginRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.email, "Email is required");
        validate_required!(self.token, "Token is required");
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoggedInResponse {
    pub user: Principal,
    pub token: String,
}

async fn register(
    State(gateway): State<AuthGateway>,
    ValidatedJson(body): ValidatedJson<RegisterRequest>,
) -> Result<Json<LoggedInResponse>, ApiError> {
    let service = gateway.service();
    let domain = |err: IdentityError| ApiError::from_domain(&err, gateway.policy());

    let user = service
        .build_principal(&body.email, &body.password)
        .await
        .map_err(domain)?;
    let token = service.register(user.clone()).await.map_err(domain)?;

    Ok(Json(LoggedInResponse { user, token }))
}

async fn login(
    State(gateway): State<AuthGateway>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<Json<LoggedInResponse>, ApiError> {
    let service = gateway.service();
    let domain = |err: IdentityError| ApiError::from_domain(&err, gateway.policy());

    let (user, token) = service
        .login_with_password(&body.email, &body.password)
        .await
        .map_err(domain)?;

    Ok(Json(LoggedInResponse { user, token }))
}

async fn magic_login(
    State(gateway): State<AuthGateway>,
    ValidatedJson(body): ValidatedJson<MagicLoginRequest>,
) -> Result<Json<LoggedInResponse>, ApiError> {
    let service = gateway.service();
    let domain = |err: IdentityError| ApiError::from_domain(&err, gateway.policy());

    let user = service.find_for_login(&body.email).await.map_err(domain)?;
    let token = service
        .magic_login(&user, &body.token)
        .await
        .map_err(domain)?;

    Ok(Json(LoggedInResponse { user, token }))
}

pub fn router() -> Router<AuthGateway> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/magic-login", post(magic_login))
}
