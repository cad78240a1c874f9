//! Identity and authentication pipeline for Gatehouse
//!
//! This crate owns everything between a presented credential and an issued
//! bearer token:
//! - [`CredentialVerifier`]: Argon2id hashing, multi-scheme verification
//! - [`TokenCodec`]: HS256 token creation, decoding and subject extraction
//! - [`AuthenticationService`]: register, login and magic login
//! - [`PrincipalStore`]: the persistence seam, with an in-memory reference
//!   implementation
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use auth_identity::{
//!     AuthenticationService, CredentialVerifier, IdentityConfig, InMemoryPrincipalStore,
//!     TokenCodec,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = IdentityConfig::from_env()?;
//!     let service = AuthenticationService::new(
//!         Arc::new(InMemoryPrincipalStore::new()),
//!         Arc::new(CredentialVerifier::new(config.argon2.clone())),
//!         Arc::new(TokenCodec::from_config(&config)?),
//!         config.password_policy.clone(),
//!     );
//!
//!     let principal = service.build_principal("user@example.com", "Secret1!").await?;
//!     let token = service.register(principal.clone()).await?;
//!     let again = service.login(&principal, "Secret1!").await?;
//!     assert!(!token.is_empty() && !again.is_empty());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

pub use crate::config::*;
pub use error::*;
pub use models::*;
pub use password::*;
pub use repository::*;
pub use service::*;
pub use token::*;
