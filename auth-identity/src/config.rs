use crate::error::ConfigError;
use crate::password::PasswordPolicy;
use crate::token::{check_subject_claim, DEFAULT_SUBJECT_CLAIM};
use crypto::kdf::Argon2Params;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

pub const ENV_PREFIX: &str = "GATEHOUSE";

/// Identity settings, read from `GATEHOUSE__*` environment variables.
///
/// Nested keys use `__` as separator, e.g. `GATEHOUSE__ARGON2__MEMORY_COST`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub signing_key: SecretString,
    pub token_ttl_seconds: i64,
    pub subject_claim: String,
    pub argon2: Argon2Params,
    pub password_policy: PasswordPolicy,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            signing_key: SecretString::new(String::new()),
            token_ttl_seconds: 24 * 60 * 60,
            subject_claim: DEFAULT_SUBJECT_CLAIM.to_string(),
            argon2: Argon2Params::default(),
            password_policy: PasswordPolicy::default(),
        }
    }
}

impl IdentityConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    pub fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        let config: IdentityConfig = settings
            .try_deserialize()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signing_key.expose_secret().is_empty() {
            return Err(ConfigError::MissingSigningKey);
        }
        if self.token_ttl_seconds <= 0 {
            return Err(ConfigError::InvalidTtl(self.token_ttl_seconds));
        }
        check_subject_claim(&self.subject_claim)?;
        self.argon2
            .validate()
            .map_err(|e| ConfigError::InvalidArgon2Params(e.to_string()))?;
        Ok(())
    }
}
