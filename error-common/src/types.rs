use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad failure classes shared by every Gatehouse crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed client input
    Validation,
    /// Bad credentials, bad or expired token
    Authentication,
    /// Authenticated principal lacks the required privilege
    Authorization,
    /// Duplicate identity
    Conflict,
    /// Failures not attributable to client input
    Internal,
}

impl ErrorCategory {
    /// HTTP status used when no deployment policy overrides it
    pub fn default_status(self) -> u16 {
        match self {
            ErrorCategory::Validation => 400,
            ErrorCategory::Authentication => 401,
            ErrorCategory::Authorization => 403,
            ErrorCategory::Conflict => 409,
            ErrorCategory::Internal => 500,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Validation => "validation_error",
            ErrorCategory::Authentication => "authentication_error",
            ErrorCategory::Authorization => "authorization_error",
            ErrorCategory::Conflict => "conflict",
            ErrorCategory::Internal => "internal_error",
        }
    }

    /// Message shown to clients when the error itself offers nothing safer
    pub fn default_client_message(self) -> &'static str {
        match self {
            ErrorCategory::Validation => "Invalid request",
            ErrorCategory::Authentication => "Unauthorized",
            ErrorCategory::Authorization => "Forbidden",
            ErrorCategory::Conflict => "Resource already exists",
            ErrorCategory::Internal => "Internal server error",
        }
    }

    /// Whether the failure is caused by the client rather than the server
    pub fn is_client_error(self) -> bool {
        !matches!(self, ErrorCategory::Internal)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error that knows which [`ErrorCategory`] it belongs to.
///
/// `Display` carries the full server-side detail; `client_message` is what
/// may be sent over the wire.
pub trait Categorized: std::error::Error {
    fn category(&self) -> ErrorCategory;

    /// Stable machine-readable code, see [`crate::codes`]
    fn code(&self) -> &'static str;

    fn client_message(&self) -> String {
        self.category().default_client_message().to_string()
    }
}
