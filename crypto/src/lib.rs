//! Password hashing and constant-time primitives for Gatehouse
//!
//! - [`kdf::Kdf`]: Argon2id hashing in PHC string format, verification of
//!   Argon2 and PBKDF2-SHA256 PHC hashes, rehash detection
//! - [`constant_time`]: comparisons whose running time does not depend on
//!   secret contents
//! - [`random`]: CSPRNG-backed password generation
//!
//! # Example
//!
//! ```rust
//! use crypto::kdf::{Argon2Params, Kdf};
//!
//! let params = Argon2Params::default();
//! let hash = Kdf::argon2_hash(b"Secret1!", &params).unwrap();
//! assert!(Kdf::verify(b"Secret1!", &hash).unwrap());
//! assert!(!Kdf::needs_rehash(&hash, &params).unwrap());
//! ```

pub mod constant_time;
pub mod error;
pub mod kdf;
pub mod random;

pub use error::*;
