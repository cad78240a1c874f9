use crypto::kdf::{Argon2Params, Kdf};
use crypto::CryptoError;
use error_common::{codes, Categorized, ErrorCategory};
use serde::Deserialize;
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Password mismatch")]
    PasswordMismatch,
}

impl Categorized for CredentialError {
    fn category(&self) -> ErrorCategory {
        match self {
            CredentialError::HashingFailed(_) => ErrorCategory::Internal,
            CredentialError::PasswordMismatch => ErrorCategory::Authentication,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            CredentialError::HashingFailed(_) => codes::internal::HASHING_FAILED,
            CredentialError::PasswordMismatch => codes::authentication::INVALID_CREDENTIALS,
        }
    }
}

impl From<CryptoError> for CredentialError {
    fn from(err: CryptoError) -> Self {
        CredentialError::HashingFailed(err.to_string())
    }
}

/// Hashes and verifies passwords.
///
/// New hashes are always Argon2id with the configured parameters. Stored
/// hashes are verified by the algorithm named in their PHC string, so Argon2
/// hashes with older parameters and PBKDF2-SHA256 hashes keep working.
#[derive(Debug, Clone, Default)]
pub struct CredentialVerifier {
    params: Argon2Params,
    /// Hash of [`DECOY_PASSWORD`] under `params`, made on first use
    decoy_hash: Arc<OnceLock<String>>,
}

const DECOY_PASSWORD: &str = "decoy-password-never-issued";

impl CredentialVerifier {
    pub fn new(params: Argon2Params) -> Self {
        Self {
            params,
            decoy_hash: Arc::default(),
        }
    }

    pub fn params(&self) -> &Argon2Params {
        &self.params
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        Ok(Kdf::argon2_hash(plaintext.as_bytes(), &self.params)?)
    }

    pub fn verify(&self, plaintext: &str, hash: &str) -> Result<(), CredentialError> {
        if Kdf::verify(plaintext.as_bytes(), hash)? {
            Ok(())
        } else {
            Err(CredentialError::PasswordMismatch)
        }
    }

    /// Whether `hash` should be replaced by a fresh hash under the current
    /// parameters the next time the plaintext is available
    pub fn needs_rehash(&self, hash: &str) -> Result<bool, CredentialError> {
        Ok(Kdf::needs_rehash(hash, &self.params)?)
    }

    /// [`hash`](Self::hash) on the blocking pool.
    ///
    /// The blocking task runs to completion even if the caller is dropped.
    pub async fn hash_password(
        &self,
        plaintext: Zeroizing<String>,
    ) -> Result<String, CredentialError> {
        let verifier = self.clone();
        tokio::task::spawn_blocking(move || verifier.hash(&plaintext))
            .await
            .map_err(|e| CredentialError::HashingFailed(format!("Hashing task failed: {e}")))?
    }

    /// [`verify`](Self::verify) on the blocking pool
    pub async fn verify_password(
        &self,
        plaintext: Zeroizing<String>,
        hash: String,
    ) -> Result<(), CredentialError> {
        let verifier = self.clone();
        tokio::task::spawn_blocking(move || verifier.verify(&plaintext, &hash))
            .await
            .map_err(|e| CredentialError::HashingFailed(format!("Verification task failed: {e}")))?
    }

    /// Do the work of [`verify_password`](Self::verify_password) against a
    /// decoy hash and discard the outcome.
    ///
    /// Login attempts for unknown accounts call this so they take as long as
    /// a wrong password.
    pub async fn verify_decoy(&self, plaintext: Zeroizing<String>) {
        let verifier = self.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            let hash = verifier
                .decoy_hash
                .get_or_init(|| verifier.hash(DECOY_PASSWORD).unwrap_or_default());
            verifier.verify(&plaintext, hash)
        })
        .await;

        if let Err(err) = outcome {
            tracing::warn!(error = %err, "Decoy verification task failed");
        }
    }
}

/// Strength rules applied to passwords chosen by users
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_digit: bool,
    pub require_special: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: true,
            require_digit: true,
            require_special: true,
        }
    }
}

impl PasswordPolicy {
    /// Returns the first rule `password` breaks, if any
    pub fn check(&self, password: &str) -> Result<(), String> {
        if password.chars().count() < self.min_length {
            return Err(format!(
                "Password must be at least {} characters long",
                self.min_length
            ));
        }

        if self.require_uppercase && !password.chars().any(char::is_uppercase) {
            return Err("Password must contain an uppercase letter".to_string());
        }

        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err("Password must contain a digit".to_string());
        }

        if self.require_special && password.chars().all(char::is_alphanumeric) {
            return Err("Password must contain a special character".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_params() -> Argon2Params {
    Argon2Params {
        memory_cost: 4096,
        time_cost: 1,
        parallelism: 1,
    }
}
