use async_trait::async_trait;
use auth_identity::Principal;
use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use error_common::codes;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::middleware::AuthenticatedPrincipal;
use crate::validation::RequestValidation;

/// The principal bound by the authentication chain.
///
/// Rejects with 500 on routes that are not behind
/// [`AuthGateway::protect`](crate::AuthGateway::protect).
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedPrincipal>()
            .cloned()
            .map(|bound| CurrentPrincipal(bound.into_inner()))
            .ok_or_else(|| {
                tracing::error!(
                    error_code = codes::internal::CONTEXT_MISSING,
                    path = %parts.uri.path(),
                    "CurrentPrincipal used on an unprotected route"
                );
                ApiError::internal("Authenticated principal missing from request")
            })
    }
}

/// JSON body that has passed [`RequestValidation`]; any failure is a 400
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + RequestValidation + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(
                error_code = codes::validation::INVALID_FORMAT,
                rejection = %rejection.body_text(),
                "Request body rejected"
            );
            ApiError::validation(format!(
                "Failed to decode body as json: {}",
                rejection.body_text()
            ))
        })?;

        value.validate()?;
        Ok(Self(value))
    }
}
