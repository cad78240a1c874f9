use crate::password::CredentialError;
use crate::repository::StoreError;
use crate::token::TokenError;
use error_common::{codes, Categorized, ErrorCategory};
use std::fmt;
use thiserror::Error;

/// Store operation a [`IdentityError::Store`] failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    AddUser,
    LookupUser,
    ListUsers,
}

impl StoreOp {
    fn client_message(self) -> &'static str {
        match self {
            StoreOp::AddUser => "Failed to add new user",
            StoreOp::LookupUser => "Failed to look up user",
            StoreOp::ListUsers => "Failed to list users",
        }
    }
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.client_message())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Failed to add new user, user already exists: {0}")]
    Conflict(String),

    #[error("{op}: {source}")]
    Store { op: StoreOp, source: StoreError },

    #[error("User email or password is incorrect")]
    InvalidCredentials,

    #[error("Magic login is not enabled for user {0}")]
    MagicLoginNotEnabled(String),

    #[error("Magic login token mismatch for user {0}")]
    MagicLoginMismatch(String),

    #[error("{0}")]
    WeakPassword(String),

    #[error("Credential error: {0}")]
    Credential(CredentialError),

    #[error("Unable to generate token: {0}")]
    Token(TokenError),
}

pub type Result<T> = std::result::Result<T, IdentityError>;

impl From<TokenError> for IdentityError {
    fn from(err: TokenError) -> Self {
        IdentityError::Token(err)
    }
}

impl From<CredentialError> for IdentityError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::PasswordMismatch => IdentityError::InvalidCredentials,
            other => IdentityError::Credential(other),
        }
    }
}

impl IdentityError {
    /// Wrap a store failure; a store-reported conflict becomes [`IdentityError::Conflict`]
    pub fn store(op: StoreOp, err: StoreError) -> Self {
        match err {
            StoreError::Conflict(detail) => IdentityError::Conflict(detail),
            source => IdentityError::Store { op, source },
        }
    }
}

impl Categorized for IdentityError {
    fn category(&self) -> ErrorCategory {
        match self {
            IdentityError::Conflict(_) => ErrorCategory::Conflict,
            IdentityError::Store { source, .. } => match source {
                StoreError::NotFound(_) => ErrorCategory::Authentication,
                _ => ErrorCategory::Internal,
            },
            IdentityError::InvalidCredentials
            | IdentityError::MagicLoginNotEnabled(_)
            | IdentityError::MagicLoginMismatch(_) => ErrorCategory::Authentication,
            IdentityError::WeakPassword(_) => ErrorCategory::Validation,
            IdentityError::Credential(err) => err.category(),
            IdentityError::Token(err) => err.category(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            IdentityError::Conflict(_) => codes::conflict::DUPLICATE_IDENTITY,
            IdentityError::Store { source, .. } => source.code(),
            IdentityError::InvalidCredentials => codes::authentication::INVALID_CREDENTIALS,
            IdentityError::MagicLoginNotEnabled(_) => codes::authentication::MAGIC_LOGIN_NOT_ENABLED,
            IdentityError::MagicLoginMismatch(_) => codes::authentication::MAGIC_LOGIN_MISMATCH,
            IdentityError::WeakPassword(_) => codes::validation::WEAK_PASSWORD,
            IdentityError::Credential(err) => err.code(),
            IdentityError::Token(err) => err.code(),
        }
    }

    fn client_message(&self) -> String {
        match self {
            IdentityError::Conflict(_) => "Failed to add new user, user already exists".to_string(),
            IdentityError::Store {
                source: StoreError::NotFound(_),
                ..
            } => ErrorCategory::Authentication.default_client_message().to_string(),
            IdentityError::Store { op, .. } => op.client_message().to_string(),
            IdentityError::InvalidCredentials | IdentityError::WeakPassword(_) => self.to_string(),
            IdentityError::MagicLoginNotEnabled(_) => "Magic login is not allowed".to_string(),
            IdentityError::MagicLoginMismatch(_) => "Magic login token mismatch".to_string(),
            IdentityError::Credential(CredentialError::PasswordMismatch) => {
                IdentityError::InvalidCredentials.to_string()
            }
            IdentityError::Credential(err) => err.client_message(),
            IdentityError::Token(TokenError::SigningFailed(_)) => {
                "Unable to generate token".to_string()
            }
            IdentityError::Token(err) => err.client_message(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Signing key is missing or empty")]
    MissingSigningKey,

    #[error("Token TTL must be positive, got {0}")]
    InvalidTtl(i64),

    #[error("Subject claim {0:?} is empty or collides with a registered claim")]
    InvalidSubjectClaim(String),

    #[error("Invalid Argon2 parameters: {0}")]
    InvalidArgon2Params(String),

    #[error("Failed to load configuration: {0}")]
    Load(String),
}

impl Categorized for ConfigError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::Internal
    }

    fn code(&self) -> &'static str {
        codes::internal::CONFIGURATION
    }
}
