//! Gatehouse server assembly
//!
//! Builds the gateway from loaded configuration and seeds the first admin.
//! `main` only parses arguments, binds and serves.

use std::sync::Arc;

use anyhow::{Context, Result};
use auth_gateway::{AuthGateway, GatewayConfig};
use auth_identity::{
    AuthenticationService, CredentialVerifier, IdentityConfig, IdentityError, PrincipalStore,
    TokenCodec,
};
use logger_redacted::redact;

pub use auth_gateway::create_app;

/// Wire store, verifier and codec into a gateway
pub fn build_gateway(
    identity: &IdentityConfig,
    gateway: &GatewayConfig,
    store: Arc<dyn PrincipalStore>,
) -> Result<AuthGateway> {
    let codec = TokenCodec::from_config(identity).context("Invalid token settings")?;
    let policy = gateway
        .status_policy()
        .context("Invalid gateway status settings")?;

    let service = AuthenticationService::new(
        store,
        Arc::new(CredentialVerifier::new(identity.argon2.clone())),
        Arc::new(codec),
        identity.password_policy.clone(),
    );

    Ok(AuthGateway::new(Arc::new(service), policy))
}

/// Credentials for the admin account created at startup
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

/// Register the bootstrap admin.
///
/// Returns `false` when the email is already taken, so restarts against a
/// persistent store are harmless.
pub async fn bootstrap_admin(gateway: &AuthGateway, admin: &BootstrapAdmin) -> Result<bool> {
    let service = gateway.service();
    let principal = service
        .build_principal(&admin.email, &admin.password)
        .await
        .context("Bootstrap admin password rejected")?
        .with_admin(true);
    let id = principal.id.clone();

    match service.register(principal).await {
        Ok(_) => {
            tracing::info!(user_id = %id, email = %redact(&admin.email), "Bootstrap admin created");
            Ok(true)
        }
        Err(IdentityError::Conflict(_)) => {
            tracing::info!(email = %redact(&admin.email), "Bootstrap admin already exists");
            Ok(false)
        }
        Err(err) => Err(err).context("Failed to create bootstrap admin"),
    }
}
