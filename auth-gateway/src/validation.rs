//! Request validation utilities for consistent validation across handlers
//!
//! Request bodies implement [`RequestValidation`]; the
//! [`ValidatedJson`](crate::ValidatedJson) extractor runs it after decoding.

use crate::error::ApiError;

/// Trait for validating request payloads
///
/// # Example
///
/// ```rust
/// use auth_gateway::{validate_email, validate_required, ApiError, RequestValidation};
///
/// struct InviteRequest {
///     email: String,
/// }
///
/// impl RequestValidation for InviteRequest {
///     fn validate(&self) -> Result<(), ApiError> {
///         validate_required!(self.email, "Email is required");
///         validate_email!(self.email, "Invalid email format");
///         Ok(())
///     }
/// }
///
/// assert!(InviteRequest { email: "a@b.com".into() }.validate().is_ok());
/// assert!(InviteRequest { email: "ab.com".into() }.validate().is_err());
/// ```
pub trait RequestValidation {
    fn validate(&self) -> Result<(), ApiError>;
}

/// Macro for validating fields with custom predicates
#[macro_export]
macro_rules! validate_field {
    ($field:expr, $predicate:expr, $message:expr) => {
        if !$predicate {
            return Err($crate::error::ApiError::validation($message));
        }
    };
}

/// Macro for validating required fields (non-empty strings)
#[macro_export]
macro_rules! validate_required {
    ($field:expr, $message:expr) => {
        $crate::validate_field!($field, !$field.trim().is_empty(), $message);
    };
}

/// Macro for validating string length
#[macro_export]
macro_rules! validate_length {
    ($field:expr, $min:expr, $max:expr, $message:expr) => {
        let len = $field.chars().count();
        $crate::validate_field!($field, len >= $min && len <= $max, $message);
    };
}

/// Macro for validating email format
#[macro_export]
macro_rules! validate_email {
    ($field:expr, $message:expr) => {
        $crate::validate_field!(
            $field,
            $crate::validation::looks_like_email(&$field),
            $message
        );
    };
}

/// One `@` with a non-empty local part and a dotted domain
pub fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
