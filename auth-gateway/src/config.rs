use axum::http::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayConfigError {
    #[error("Status {0} is not a client error status")]
    InvalidStatus(u16),

    #[error("Failed to load gateway configuration: {0}")]
    Load(String),
}

/// Statuses the deployment chooses for failures whose code is a matter of
/// taste: duplicate registration and insufficient privilege
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPolicy {
    conflict: StatusCode,
    forbidden: StatusCode,
}

impl Default for StatusPolicy {
    fn default() -> Self {
        Self {
            conflict: StatusCode::CONFLICT,
            forbidden: StatusCode::UNAUTHORIZED,
        }
    }
}

impl StatusPolicy {
    pub fn new(conflict: StatusCode, forbidden: StatusCode) -> Self {
        Self {
            conflict,
            forbidden,
        }
    }

    pub fn conflict(&self) -> StatusCode {
        self.conflict
    }

    pub fn forbidden(&self) -> StatusCode {
        self.forbidden
    }
}

/// Gateway settings, read from the same `GATEHOUSE__*` environment as the
/// identity settings (`GATEHOUSE__CONFLICT_STATUS`, `GATEHOUSE__FORBIDDEN_STATUS`)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub conflict_status: u16,
    pub forbidden_status: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            conflict_status: StatusCode::CONFLICT.as_u16(),
            forbidden_status: StatusCode::UNAUTHORIZED.as_u16(),
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, GatewayConfigError> {
        Self::from_env_with_prefix(auth_identity::ENV_PREFIX)
    }

    pub fn from_env_with_prefix(prefix: &str) -> Result<Self, GatewayConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::with_prefix(prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(|e| GatewayConfigError::Load(e.to_string()))
    }

    pub fn status_policy(&self) -> Result<StatusPolicy, GatewayConfigError> {
        Ok(StatusPolicy::new(
            client_error_status(self.conflict_status)?,
            client_error_status(self.forbidden_status)?,
        ))
    }
}

fn client_error_status(code: u16) -> Result<StatusCode, GatewayConfigError> {
    StatusCode::from_u16(code)
        .ok()
        .filter(StatusCode::is_client_error)
        .ok_or(GatewayConfigError::InvalidStatus(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = GatewayConfig::default().status_policy().unwrap();
        assert_eq!(policy, StatusPolicy::default());
        assert_eq!(policy.conflict(), StatusCode::CONFLICT);
        assert_eq!(policy.forbidden(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_forbidden_as_403() {
        let config = GatewayConfig {
            forbidden_status: 403,
            ..Default::default()
        };
        assert_eq!(
            config.status_policy().unwrap().forbidden(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_rejects_non_client_status() {
        let config = GatewayConfig {
            conflict_status: 500,
            ..Default::default()
        };
        assert_eq!(
            config.status_policy(),
            Err(GatewayConfigError::InvalidStatus(500))
        );
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("GHGW_TEST__FORBIDDEN_STATUS", "403");
        let config = GatewayConfig::from_env_with_prefix("GHGW_TEST").unwrap();
        assert_eq!(config.forbidden_status, 403);
        assert_eq!(config.conflict_status, 409);
    }
}
