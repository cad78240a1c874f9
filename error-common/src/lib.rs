//! Common error handling utilities for Gatehouse
//!
//! This crate holds the error taxonomy shared by every Gatehouse crate. Domain
//! errors (credential, token, store, pipeline) stay in the crate that raises
//! them; they implement [`Categorized`] so the HTTP boundary can map any of
//! them to a status code and a client-safe message without knowing their
//! concrete type.
//!
//! # Error Categories
//!
//! - **Validation**: malformed client input (400)
//! - **Authentication**: bad credentials, bad or expired token (401)
//! - **Authorization**: valid principal, insufficient privilege (401/403)
//! - **Conflict**: duplicate identity (409, or 401 by policy)
//! - **Internal**: store, codec and hashing failures (500)
//!
//! # Example
//!
//! ```rust
//! use error_common::{codes, Categorized, ErrorCategory};
//!
//! #[derive(Debug)]
//! struct Expired;
//!
//! impl std::fmt::Display for Expired {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         f.write_str("token expired")
//!     }
//! }
//!
//! impl std::error::Error for Expired {}
//!
//! impl Categorized for Expired {
//!     fn category(&self) -> ErrorCategory {
//!         ErrorCategory::Authentication
//!     }
//!
//!     fn code(&self) -> &'static str {
//!         codes::authentication::TOKEN_EXPIRED
//!     }
//! }
//!
//! assert_eq!(Expired.category().default_status(), 401);
//! assert_eq!(Expired.client_message(), "Unauthorized");
//! ```

pub mod codes;
pub mod reporting;
pub mod types;

pub use reporting::*;
pub use types::*;
