//! HTTP authentication gateway for Gatehouse
//!
//! Wires the identity pipeline into axum:
//!
//! - [`AuthGateway`]: shared state, and [`AuthGateway::protect`] which puts a
//!   router behind the authentication chain
//! - [`middleware`]: `verify_token` → `authenticate` → `load_user`
//! - [`admin::require_admin`]: admin gate for routes behind the chain
//! - [`CurrentPrincipal`] / [`ValidatedJson`]: extractors for handlers
//! - [`ApiError`]: the only place errors become responses, always
//!   `{"Error": "<message>"}`
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use auth_gateway::{create_app, AuthGateway, StatusPolicy};
//! use auth_identity::{
//!     AuthenticationService, CredentialVerifier, InMemoryPrincipalStore, PasswordPolicy,
//!     TokenCodec,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = AuthenticationService::new(
//!     Arc::new(InMemoryPrincipalStore::new()),
//!     Arc::new(CredentialVerifier::default()),
//!     Arc::new(TokenCodec::new(b"signing-key", 3600)?),
//!     PasswordPolicy::default(),
//! );
//! let app = create_app(AuthGateway::new(Arc::new(service), StatusPolicy::default()));
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

pub mod admin;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod validation;

pub use crate::config::*;
pub use error::*;
pub use extractors::*;
pub use middleware::{AuthenticatedPrincipal, TokenVerification};
pub use state::*;
pub use validation::*;

use axum::Router;
use tower_http::trace::TraceLayer;

/// Build the complete application router
pub fn create_app(gateway: AuthGateway) -> Router {
    Router::new()
        .merge(routes::health_router())
        .merge(routes::anonymous::router())
        .merge(routes::authenticated_router(&gateway))
        .nest("/admin", routes::users::router(&gateway))
        .layer(TraceLayer::new_for_http())
        .with_state(gateway)
}
