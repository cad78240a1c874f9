use crate::config::IdentityConfig;
use crate::error::ConfigError;
use crate::models::Principal;
use chrono::Utc;
use error_common::{codes, Categorized, ErrorCategory};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_SUBJECT_CLAIM: &str = "user_id";

/// Claims every token carries as [`TokenClaims`] fields
pub const REGISTERED_CLAIMS: [&str; 2] = ["iat", "exp"];

/// A subject claim must be non-empty and must not shadow a registered claim
pub fn check_subject_claim(claim: &str) -> Result<(), ConfigError> {
    if claim.is_empty() || REGISTERED_CLAIMS.contains(&claim) {
        return Err(ConfigError::InvalidSubjectClaim(claim.to_string()));
    }
    Ok(())
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token signing failed: {0}")]
    SigningFailed(String),

    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Claim '{0}' is missing")]
    ClaimMissing(String),

    #[error("Claim '{0}' is not a string")]
    ClaimWrongType(String),
}

impl Categorized for TokenError {
    fn category(&self) -> ErrorCategory {
        match self {
            TokenError::SigningFailed(_) => ErrorCategory::Internal,
            _ => ErrorCategory::Authentication,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            TokenError::SigningFailed(_) => codes::internal::SIGNING_FAILED,
            TokenError::TokenInvalid(_) => codes::authentication::TOKEN_INVALID,
            TokenError::TokenExpired => codes::authentication::TOKEN_EXPIRED,
            TokenError::ClaimMissing(_) => codes::authentication::CLAIM_MISSING,
            TokenError::ClaimWrongType(_) => codes::authentication::CLAIM_WRONG_TYPE,
        }
    }
}

/// JWT claims: registered timestamps plus whatever identity claims the
/// deployment adds, including the subject claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issued at (seconds since epoch)
    pub iat: i64,
    /// Expiration (seconds since epoch)
    pub exp: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Adds deployment-defined identity claims to a token being created
pub type ClaimsMapper =
    Arc<dyn Fn(&Principal, &mut Map<String, Value>) -> Result<(), TokenError> + Send + Sync>;

/// Default mapper: records the principal's email
pub fn email_claims_mapper() -> ClaimsMapper {
    Arc::new(|principal, claims| {
        claims.insert("email".to_string(), Value::String(principal.email.clone()));
        Ok(())
    })
}

/// Creates and decodes HS256 bearer tokens.
///
/// The signing key and TTL are fixed at construction.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: i64,
    subject_claim: String,
    claims_mapper: ClaimsMapper,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl_seconds", &self.ttl_seconds)
            .field("subject_claim", &self.subject_claim)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(signing_key: &[u8], ttl_seconds: i64) -> Result<Self, ConfigError> {
        if signing_key.is_empty() {
            return Err(ConfigError::MissingSigningKey);
        }
        if ttl_seconds <= 0 {
            return Err(ConfigError::InvalidTtl(ttl_seconds));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(signing_key),
            decoding_key: DecodingKey::from_secret(signing_key),
            validation,
            ttl_seconds,
            subject_claim: DEFAULT_SUBJECT_CLAIM.to_string(),
            claims_mapper: email_claims_mapper(),
        })
    }

    pub fn from_config(config: &IdentityConfig) -> Result<Self, ConfigError> {
        Self::new(
            config.signing_key.expose_secret().as_bytes(),
            config.token_ttl_seconds,
        )?
        .with_subject_claim(config.subject_claim.clone())
    }

    pub fn with_subject_claim(mut self, claim: impl Into<String>) -> Result<Self, ConfigError> {
        let claim = claim.into();
        check_subject_claim(&claim)?;
        self.subject_claim = claim;
        Ok(self)
    }

    pub fn with_claims_mapper(mut self, mapper: ClaimsMapper) -> Self {
        self.claims_mapper = mapper;
        self
    }

    pub fn subject_claim(&self) -> &str {
        &self.subject_claim
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Issue a token for `principal`.
    ///
    /// The subject claim is written after the claims mapper runs, so a
    /// mapper cannot replace it.
    pub fn create(&self, principal: &Principal) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();

        let mut extra = Map::new();
        (self.claims_mapper)(principal, &mut extra)?;
        extra.remove("iat");
        extra.remove("exp");
        extra.insert(
            self.subject_claim.clone(),
            Value::String(principal.id.clone()),
        );

        let claims = TokenClaims {
            iat: now,
            exp: now.saturating_add(self.ttl_seconds),
            extra,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::SigningFailed(e.to_string()))
    }

    /// Verify signature and expiry, returning the claims
    pub fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::TokenExpired,
                _ => TokenError::TokenInvalid(e.to_string()),
            },
        )?;

        // jsonwebtoken still accepts a token in the second its exp names
        if data.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::TokenExpired);
        }

        Ok(data.claims)
    }

    pub fn claims_to_subject_id(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        match claims.extra.get(&self.subject_claim) {
            None => Err(TokenError::ClaimMissing(self.subject_claim.clone())),
            Some(Value::String(id)) => Ok(id.clone()),
            Some(_) => Err(TokenError::ClaimWrongType(self.subject_claim.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::time::Duration;

    const KEY: &[u8] = b"test-signing-key";

    fn codec() -> TokenCodec {
        TokenCodec::new(KEY, 3600).unwrap()
    }

    fn sign_raw(claims: &Value, key: &[u8]) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(key),
        )
        .unwrap()
    }

    #[test]
    fn test_create_decode_round_trip() {
        let codec = codec();
        let principal = Principal::new("a@b.com", "hash");
        let token = codec.create(&principal).unwrap();

        let claims = codec.decode(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.extra["email"], "a@b.com");
        assert_eq!(codec.claims_to_subject_id(&claims).unwrap(), principal.id);
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(
            TokenCodec::new(b"", 60),
            Err(ConfigError::MissingSigningKey)
        ));
        assert!(matches!(
            TokenCodec::new(KEY, 0),
            Err(ConfigError::InvalidTtl(0))
        ));
    }

    #[tokio::test]
    async fn test_expired_token() {
        let codec = TokenCodec::new(KEY, 1).unwrap();
        let token = codec.create(&Principal::new("a@b.com", "h")).unwrap();
        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert_eq!(codec.decode(&token), Err(TokenError::TokenExpired));
    }

    #[test]
    fn test_wrong_key_is_invalid() {
        let token = TokenCodec::new(b"K1", 60)
            .unwrap()
            .create(&Principal::new("a@b.com", "h"))
            .unwrap();
        let result = TokenCodec::new(b"K2", 60).unwrap().decode(&token);
        assert!(matches!(result, Err(TokenError::TokenInvalid(_))));
    }

    #[test]
    fn test_mis_signed_expired_token_is_invalid() {
        let now = Utc::now().timestamp();
        let token = sign_raw(
            &serde_json::json!({"iat": now - 100, "exp": now - 50, "user_id": "u1"}),
            b"other-key",
        );
        assert!(matches!(codec().decode(&token), Err(TokenError::TokenInvalid(_))));
    }

    #[test]
    fn test_garbage_and_unsigned_tokens() {
        let codec = codec();
        assert!(matches!(codec.decode("not.a.jwt"), Err(TokenError::TokenInvalid(_))));
        assert!(matches!(codec.decode(""), Err(TokenError::TokenInvalid(_))));

        // alg=none header with an empty signature
        let unsigned = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.eyJ1c2VyX2lkIjoidTEiLCJleHAiOjk5OTk5OTk5OTl9.";
        assert!(matches!(codec.decode(unsigned), Err(TokenError::TokenInvalid(_))));
    }

    #[test]
    fn test_subject_claim_errors() {
        let codec = codec();
        let now = Utc::now().timestamp();

        let missing = sign_raw(&serde_json::json!({"iat": now, "exp": now + 60}), KEY);
        let claims = codec.decode(&missing).unwrap();
        assert_eq!(
            codec.claims_to_subject_id(&claims),
            Err(TokenError::ClaimMissing("user_id".to_string()))
        );

        let numeric = sign_raw(
            &serde_json::json!({"iat": now, "exp": now + 60, "user_id": 42}),
            KEY,
        );
        let claims = codec.decode(&numeric).unwrap();
        assert_eq!(
            codec.claims_to_subject_id(&claims),
            Err(TokenError::ClaimWrongType("user_id".to_string()))
        );
    }

    #[test]
    fn test_mapper_cannot_override_subject() {
        let codec = codec()
            .with_subject_claim("sub")
            .unwrap()
            .with_claims_mapper(Arc::new(|_, claims| {
                claims.insert("sub".to_string(), Value::String("attacker".to_string()));
                claims.insert("role".to_string(), Value::String("viewer".to_string()));
                Ok(())
            }));
        let principal = Principal::new("a@b.com", "h");

        let claims = codec.decode(&codec.create(&principal).unwrap()).unwrap();
        assert_eq!(codec.claims_to_subject_id(&claims).unwrap(), principal.id);
        assert_eq!(claims.extra["role"], "viewer");
        assert!(claims.extra.get("email").is_none());
    }

    #[test]
    fn test_registered_claims_cannot_be_subject() {
        for claim in ["exp", "iat", ""] {
            assert_eq!(
                codec().with_subject_claim(claim).unwrap_err(),
                ConfigError::InvalidSubjectClaim(claim.to_string())
            );
        }

        let codec = codec().with_subject_claim("sub").unwrap();
        let principal = Principal::new("a@b.com", "h");
        let claims = codec.decode(&codec.create(&principal).unwrap()).unwrap();
        assert_eq!(codec.claims_to_subject_id(&claims).unwrap(), principal.id);
    }

    #[test]
    fn test_mapper_failure_propagates() {
        let codec = codec().with_claims_mapper(Arc::new(|_, _| {
            Err(TokenError::SigningFailed("directory unavailable".to_string()))
        }));
        let err = codec.create(&Principal::new("a@b.com", "h")).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Internal);
    }

    #[test]
    fn test_expired_and_invalid_share_client_message() {
        assert_eq!(
            TokenError::TokenExpired.client_message(),
            TokenError::TokenInvalid("bad".to_string()).client_message()
        );
        assert_ne!(TokenError::TokenExpired.code(), TokenError::TokenInvalid(String::new()).code());
    }

    proptest! {
        #[test]
        fn subject_survives_round_trip(id in "[a-zA-Z0-9-]{1,40}", email in "[a-z]{1,10}@[a-z]{1,10}\\.com") {
            let codec = codec();
            let mut principal = Principal::new(email, "h");
            principal.id = id.clone();

            let claims = codec.decode(&codec.create(&principal).unwrap()).unwrap();
            prop_assert_eq!(codec.claims_to_subject_id(&claims).unwrap(), id);
        }
    }
}
