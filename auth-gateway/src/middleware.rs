//! Request authentication chain
//!
//! Three middleware functions, always applied in this order by
//! [`AuthGateway::protect`](crate::AuthGateway::protect):
//!
//! 1. [`verify_token`] decodes the bearer token, if any, and records the
//!    outcome as a [`TokenVerification`]. It never rejects.
//! 2. [`authenticate`] rejects with 401 unless the outcome is `Verified`.
//! 3. [`load_user`] resolves the subject claim to a stored principal and
//!    binds it to the request as an [`AuthenticatedPrincipal`].

use std::ops::Deref;

use auth_identity::{Principal, StoreError, TokenClaims, TokenError};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use error_common::{codes, Categorized};

use crate::error::ApiError;
use crate::state::AuthGateway;

/// Outcome of bearer token verification for one request
#[derive(Debug, Clone, PartialEq)]
pub enum TokenVerification {
    /// No usable `Authorization: Bearer` header
    Missing,
    Verified(TokenClaims),
    Invalid(TokenError),
}

/// The principal the current request acts as.
///
/// Only [`load_user`] creates one, so a handler that finds it in the request
/// extensions knows the whole chain ran.
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal {
    principal: Principal,
}

impl AuthenticatedPrincipal {
    pub(crate) fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn into_inner(self) -> Principal {
        self.principal
    }
}

impl Deref for AuthenticatedPrincipal {
    type Target = Principal;

    fn deref(&self) -> &Principal {
        &self.principal
    }
}

/// Bearer token from the `Authorization` header; the scheme is matched
/// case-insensitively
pub fn extract_bearer(request: &Request) -> Option<&str> {
    let value = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

pub async fn verify_token(
    State(gateway): State<AuthGateway>,
    mut request: Request,
    next: Next,
) -> Response {
    let verification = match extract_bearer(&request) {
        None => TokenVerification::Missing,
        Some(token) => match gateway.codec().decode(token) {
            Ok(claims) => TokenVerification::Verified(claims),
            Err(err) => TokenVerification::Invalid(err),
        },
    };

    request.extensions_mut().insert(verification);
    next.run(request).await
}

pub async fn authenticate(request: Request, next: Next) -> Result<Response, ApiError> {
    match request.extensions().get::<TokenVerification>() {
        Some(TokenVerification::Verified(_)) => {}
        Some(TokenVerification::Invalid(err)) => {
            tracing::warn!(
                error_code = err.code(),
                error = %err,
                path = %request.uri().path(),
                "Bearer token rejected"
            );
            return Err(ApiError::authentication(err.to_string()));
        }
        Some(TokenVerification::Missing) | None => {
            tracing::warn!(
                error_code = codes::authentication::TOKEN_MISSING,
                path = %request.uri().path(),
                "Missing bearer token"
            );
            return Err(ApiError::authentication("Missing bearer token"));
        }
    }

    Ok(next.run(request).await)
}

pub async fn load_user(
    State(gateway): State<AuthGateway>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = match request.extensions().get::<TokenVerification>() {
        Some(TokenVerification::Verified(claims)) => claims.clone(),
        _ => {
            tracing::error!(
                error_code = codes::internal::CONTEXT_MISSING,
                "load_user ran without a verified token; check middleware order"
            );
            return Err(ApiError::internal("Token verification state missing"));
        }
    };

    let user_id = gateway.codec().claims_to_subject_id(&claims).map_err(|err| {
        tracing::warn!(error_code = err.code(), error = %err, "Failed to get user ID from token claims");
        ApiError::from_domain(&err, gateway.policy())
    })?;

    let principal = match gateway.store().get(&user_id).await {
        Ok(principal) => principal,
        Err(err @ StoreError::NotFound(_)) => {
            tracing::warn!(user_id = %user_id, "Token subject no longer exists");
            return Err(ApiError::from_domain(&err, gateway.policy()));
        }
        Err(err) => {
            tracing::error!(user_id = %user_id, error = %err, "Failed to load user");
            return Err(ApiError::from_domain(&err, gateway.policy()));
        }
    };

    tracing::debug!(user_id = %principal.id, is_admin = principal.is_admin, "Request authenticated");
    request
        .extensions_mut()
        .insert(AuthenticatedPrincipal::new(principal));

    Ok(next.run(request).await)
}
