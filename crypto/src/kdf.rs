use crate::error::CryptoError;
use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use pbkdf2::Pbkdf2;
use serde::{Deserialize, Serialize};

/// Key derivation result
pub type KdfResult<T> = Result<T, CryptoError>;

/// Argon2 parameters for password hashing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Argon2Params {
    /// Memory cost in KiB (minimum 19456 for Argon2id)
    pub memory_cost: u32,
    /// Time cost (iterations)
    pub time_cost: u32,
    /// Parallelism factor
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_cost: 19456, // 19 MiB
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl Argon2Params {
    fn to_argon2(&self) -> KdfResult<Argon2<'static>> {
        let params = argon2::Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|e| CryptoError::InvalidParams(e.to_string()))?;
        Ok(Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            params,
        ))
    }

    /// Reject parameter sets argon2 would refuse at hash time
    pub fn validate(&self) -> KdfResult<()> {
        self.to_argon2().map(|_| ())
    }
}

/// Password hashing utilities
pub struct Kdf;

impl Kdf {
    /// Hash a password using Argon2id
    ///
    /// Returns the password hash in PHC string format which includes:
    /// - Algorithm identifier
    /// - Parameters (memory, iterations, parallelism)
    /// - Salt (base64)
    /// - Hash (base64)
    pub fn argon2_hash(password: &[u8], params: &Argon2Params) -> KdfResult<String> {
        let salt = SaltString::generate(&mut rand::thread_rng());

        let password_hash = params
            .to_argon2()?
            .hash_password(password, &salt)
            .map_err(|e| CryptoError::HashingFailed(e.to_string()))?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a PHC hash string.
    ///
    /// The algorithm is taken from the hash itself: Argon2 (any variant and
    /// parameters) and PBKDF2-SHA256 are accepted. `Ok(false)` means the
    /// password does not match; an unparseable hash is an error.
    pub fn verify(password: &[u8], password_hash: &str) -> KdfResult<bool> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|e| CryptoError::MalformedHash(e.to_string()))?;

        let argon2 = Argon2::default();
        let verifiers: [&dyn PasswordVerifier; 2] = [&argon2, &Pbkdf2];

        match parsed_hash.verify_password(&verifiers, password) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(CryptoError::HashingFailed(e.to_string())),
        }
    }

    /// Whether a stored hash was produced by anything other than Argon2id
    /// with exactly `params`
    pub fn needs_rehash(password_hash: &str, params: &Argon2Params) -> KdfResult<bool> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|e| CryptoError::MalformedHash(e.to_string()))?;

        if parsed_hash.algorithm != argon2::ARGON2ID_IDENT
            || parsed_hash.version != Some(argon2::Version::V0x13.into())
        {
            return Ok(true);
        }

        let stored = argon2::Params::try_from(&parsed_hash)
            .map_err(|e| CryptoError::MalformedHash(e.to_string()))?;

        Ok(stored.m_cost() != params.memory_cost
            || stored.t_cost() != params.time_cost
            || stored.p_cost() != params.parallelism)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_params() -> Argon2Params {
        Argon2Params {
            memory_cost: 4096,
            time_cost: 1,
            parallelism: 1,
        }
    }

    fn pbkdf2_hash(password: &[u8]) -> String {
        let salt = SaltString::generate(&mut rand::thread_rng());
        Pbkdf2
            .hash_password_customized(
                password,
                None,
                None,
                pbkdf2::Params {
                    rounds: 1_000,
                    output_length: 32,
                },
                &salt,
            )
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_argon2_hash_verify() {
        let password = b"secure_password_123";
        let hash = Kdf::argon2_hash(password, &fast_params()).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(Kdf::verify(password, &hash).unwrap());
        assert!(!Kdf::verify(b"wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let a = Kdf::argon2_hash(b"same", &fast_params()).unwrap();
        let b = Kdf::argon2_hash(b"same", &fast_params()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_pbkdf2_hash() {
        let hash = pbkdf2_hash(b"legacy-pass");
        assert!(hash.starts_with("$pbkdf2-sha256$"));
        assert!(Kdf::verify(b"legacy-pass", &hash).unwrap());
        assert!(!Kdf::verify(b"legacy-pasS", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_error() {
        assert!(matches!(
            Kdf::verify(b"anything", "not-a-phc-string"),
            Err(CryptoError::MalformedHash(_))
        ));
        assert!(Kdf::needs_rehash("", &fast_params()).is_err());
    }

    #[test]
    fn test_needs_rehash() {
        let params = fast_params();
        let hash = Kdf::argon2_hash(b"pw", &params).unwrap();
        assert!(!Kdf::needs_rehash(&hash, &params).unwrap());

        let stronger = Argon2Params {
            time_cost: 3,
            ..params.clone()
        };
        assert!(Kdf::needs_rehash(&hash, &stronger).unwrap());

        assert!(Kdf::needs_rehash(&pbkdf2_hash(b"pw"), &params).unwrap());
    }

    #[test]
    fn test_invalid_params() {
        let params = Argon2Params {
            memory_cost: 1,
            time_cost: 0,
            parallelism: 1,
        };
        assert!(matches!(params.validate(), Err(CryptoError::InvalidParams(_))));
        assert!(Argon2Params::default().validate().is_ok());
    }
}
