use std::sync::Arc;

use auth_identity::{AuthenticationService, PrincipalStore, TokenCodec};
use axum::{middleware::{from_fn, from_fn_with_state}, Router};
use tower::ServiceBuilder;

use crate::config::StatusPolicy;
use crate::middleware::{authenticate, load_user, verify_token};

/// Shared state for the middleware chain and handlers.
///
/// Cloned once per request; holds only `Arc`s of immutable components.
#[derive(Clone)]
pub struct AuthGateway {
    service: Arc<AuthenticationService>,
    policy: Arc<StatusPolicy>,
}

impl AuthGateway {
    pub fn new(service: Arc<AuthenticationService>, policy: StatusPolicy) -> Self {
        Self {
            service,
            policy: Arc::new(policy),
        }
    }

    pub fn service(&self) -> &AuthenticationService {
        &self.service
    }

    pub fn codec(&self) -> &TokenCodec {
        self.service.codec()
    }

    pub fn store(&self) -> &Arc<dyn PrincipalStore> {
        self.service.store()
    }

    pub fn policy(&self) -> &StatusPolicy {
        &self.policy
    }

    /// Put every route of `router` behind verify, authenticate and load-user,
    /// in that order.
    ///
    /// Routes added to `router` afterwards are not covered.
    pub fn protect<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.route_layer(
            ServiceBuilder::new()
                .layer(from_fn_with_state(self.clone(), verify_token))
                .layer(from_fn(authenticate))
                .layer(from_fn_with_state(self.clone(), load_user)),
        )
    }
}
