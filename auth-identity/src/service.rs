use crate::{error::*, models::*, password::*, repository::*, token::*};
use crypto::constant_time::ct_eq_str;
use crypto::random::random_password;
use logger_redacted::redact;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Turns presented credentials into issued tokens.
///
/// Only [`register`](Self::register) and [`provision`](Self::provision)
/// write to the store; every other operation reads.
#[derive(Clone)]
pub struct AuthenticationService {
    store: Arc<dyn PrincipalStore>,
    verifier: Arc<CredentialVerifier>,
    codec: Arc<TokenCodec>,
    policy: PasswordPolicy,
}

impl AuthenticationService {
    pub fn new(
        store: Arc<dyn PrincipalStore>,
        verifier: Arc<CredentialVerifier>,
        codec: Arc<TokenCodec>,
        policy: PasswordPolicy,
    ) -> Self {
        Self {
            store,
            verifier,
            codec,
            policy,
        }
    }

    pub fn store(&self) -> &Arc<dyn PrincipalStore> {
        &self.store
    }

    pub fn codec(&self) -> &Arc<TokenCodec> {
        &self.codec
    }

    pub fn verifier(&self) -> &Arc<CredentialVerifier> {
        &self.verifier
    }

    /// Check `password` against the policy and build an unsaved principal
    /// holding its hash
    pub async fn build_principal(&self, email: &str, password: &str) -> Result<Principal> {
        self.policy
            .check(password)
            .map_err(IdentityError::WeakPassword)?;

        let hash = self
            .verifier
            .hash_password(Zeroizing::new(password.to_string()))
            .await?;
        Ok(Principal::new(email.trim(), hash))
    }

    /// Persist a new principal and issue its first token
    pub async fn register(&self, principal: Principal) -> Result<String> {
        let email = redact(&principal.email);

        if let Err(err) = self.store.add(principal.clone()).await {
            let err = IdentityError::store(StoreOp::AddUser, err);
            match &err {
                IdentityError::Conflict(_) => {
                    tracing::warn!(email = %email, error = %err, "Registration rejected, user already exists");
                }
                _ => {
                    tracing::error!(email = %email, error = %err, "Failed to add new user");
                }
            }
            return Err(err);
        }

        let token = self.issue(&principal)?;
        tracing::info!(user_id = %principal.id, email = %email, "User registered");
        Ok(token)
    }

    /// Look up the principal a login attempt names.
    ///
    /// An unknown email is reported exactly like a wrong password.
    pub async fn find_for_login(&self, email: &str) -> Result<Principal> {
        match self.store.find_by_email(email).await {
            Ok(Some(principal)) => Ok(principal),
            Ok(None) => {
                tracing::warn!(email = %redact(email), "Login for unknown email");
                Err(IdentityError::InvalidCredentials)
            }
            Err(err) => {
                tracing::error!(email = %redact(email), error = %err, "Failed to look up user");
                Err(IdentityError::store(StoreOp::LookupUser, err))
            }
        }
    }

    /// Password login by email.
    ///
    /// An unknown email still pays for one password verification, so the
    /// response time does not reveal which accounts exist.
    pub async fn login_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(Principal, String)> {
        let principal = match self.find_for_login(email).await {
            Ok(principal) => principal,
            Err(IdentityError::InvalidCredentials) => {
                self.verifier
                    .verify_decoy(Zeroizing::new(password.to_string()))
                    .await;
                return Err(IdentityError::InvalidCredentials);
            }
            Err(err) => return Err(err),
        };

        let token = self.login(&principal, password).await?;
        Ok((principal, token))
    }

    pub async fn login(&self, principal: &Principal, password: &str) -> Result<String> {
        if let Err(err) = self
            .verifier
            .verify_password(
                Zeroizing::new(password.to_string()),
                principal.password_hash.clone(),
            )
            .await
        {
            match err {
                CredentialError::PasswordMismatch => {
                    tracing::warn!(user_id = %principal.id, "User password mismatch");
                }
                CredentialError::HashingFailed(_) => {
                    tracing::error!(user_id = %principal.id, error = %err, "Stored password hash unusable");
                }
            }
            return Err(err.into());
        }

        let token = self.issue(principal)?;
        tracing::info!(user_id = %principal.id, "User logged in");
        Ok(token)
    }

    /// Exchange a stored one-time secret for a token.
    ///
    /// The stored token is left in place; clearing it is up to the store's
    /// owner.
    pub async fn magic_login(&self, principal: &Principal, presented: &str) -> Result<String> {
        let Some(stored) = principal.magic_login_token.as_deref() else {
            tracing::warn!(user_id = %principal.id, "Magic login attempted without a stored token");
            return Err(IdentityError::MagicLoginNotEnabled(principal.id.clone()));
        };

        if !ct_eq_str(stored, presented) {
            tracing::warn!(user_id = %principal.id, "Magic login token mismatch");
            return Err(IdentityError::MagicLoginMismatch(principal.id.clone()));
        }

        let token = self.issue(principal)?;
        tracing::info!(user_id = %principal.id, "User logged in with magic token");
        Ok(token)
    }

    /// Create an account on someone's behalf with a random password they
    /// never see; they sign in through magic login or a reset flow
    pub async fn provision(&self, email: &str, is_admin: bool) -> Result<Principal> {
        let hash = self.verifier.hash_password(random_password()).await?;
        let principal = Principal::new(email.trim(), hash).with_admin(is_admin);

        self.store.add(principal.clone()).await.map_err(|err| {
            tracing::error!(email = %redact(email), error = %err, "Failed to add user");
            IdentityError::store(StoreOp::AddUser, err)
        })?;

        tracing::info!(user_id = %principal.id, is_admin, "User provisioned");
        Ok(principal)
    }

    pub async fn list(&self) -> Result<Vec<Principal>> {
        self.store.list().await.map_err(|err| {
            tracing::error!(error = %err, "Failed to list users");
            IdentityError::store(StoreOp::ListUsers, err)
        })
    }

    fn issue(&self, principal: &Principal) -> Result<String> {
        self.codec.create(principal).map_err(|err| {
            tracing::error!(user_id = %principal.id, error = %err, "Unable to generate token");
            IdentityError::Token(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use error_common::{Categorized, ErrorCategory};
    use mockall::{mock, predicate::*};

    mock! {
        pub Store {}

        #[async_trait]
        impl PrincipalStore for Store {
            async fn add(&self, principal: Principal) -> std::result::Result<(), StoreError>;
            async fn get(&self, id: &str) -> std::result::Result<Principal, StoreError>;
            async fn find_by_email(&self, email: &str) -> std::result::Result<Option<Principal>, StoreError>;
            async fn list(&self) -> std::result::Result<Vec<Principal>, StoreError>;
            async fn update(&self, principal: Principal) -> std::result::Result<(), StoreError>;
        }
    }

    fn service_with(store: Arc<dyn PrincipalStore>) -> AuthenticationService {
        AuthenticationService::new(
            store,
            Arc::new(CredentialVerifier::new(test_params())),
            Arc::new(TokenCodec::new(b"service-test-key", 3600).unwrap()),
            PasswordPolicy::default(),
        )
    }

    fn service() -> AuthenticationService {
        service_with(Arc::new(InMemoryPrincipalStore::new()))
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let service = service();
        let principal = service.build_principal("a@b.com", "Secret1!").await.unwrap();

        let token = service.register(principal.clone()).await.unwrap();
        let claims = service.codec().decode(&token).unwrap();
        assert_eq!(service.codec().claims_to_subject_id(&claims).unwrap(), principal.id);

        let found = service.find_for_login("A@B.COM").await.unwrap();
        assert!(service.login(&found, "Secret1!").await.is_ok());
        assert_eq!(
            service.login(&found, "Secret2!").await,
            Err(IdentityError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn test_unknown_email_same_as_wrong_password() {
        let service = service();
        let err = service.find_for_login("ghost@b.com").await.unwrap_err();
        assert_eq!(err, IdentityError::InvalidCredentials);
        assert_eq!(err.client_message(), "User email or password is incorrect");
    }

    #[tokio::test]
    async fn test_weak_password_rejected_before_hashing() {
        let err = service().build_principal("a@b.com", "short").await.unwrap_err();
        assert!(matches!(err, IdentityError::WeakPassword(_)));
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[tokio::test]
    async fn test_register_duplicate_is_conflict() {
        let service = service();
        let first = service.build_principal("a@b.com", "Secret1!").await.unwrap();
        let second = service.build_principal("a@b.com", "Secret1!").await.unwrap();

        service.register(first).await.unwrap();
        let err = service.register(second).await.unwrap_err();
        assert!(matches!(err, IdentityError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_register_store_failure_is_internal() {
        let mut store = MockStore::new();
        store
            .expect_add()
            .times(1)
            .returning(|_| Err(StoreError::Backend("disk full".to_string())));

        let service = service_with(Arc::new(store));
        let err = service
            .register(Principal::new("a@b.com", "hash"))
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert_eq!(err.client_message(), "Failed to add new user");
    }

    #[tokio::test]
    async fn test_lookup_store_failure_is_internal() {
        let mut store = MockStore::new();
        store
            .expect_find_by_email()
            .with(eq("a@b.com"))
            .returning(|_| Err(StoreError::Backend("timeout".to_string())));

        let err = service_with(Arc::new(store))
            .find_for_login("a@b.com")
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert_eq!(err.client_message(), "Failed to look up user");
    }

    #[tokio::test]
    async fn test_list_store_failure_names_listing() {
        let mut store = MockStore::new();
        store
            .expect_list()
            .returning(|| Err(StoreError::Backend("timeout".to_string())));

        let err = service_with(Arc::new(store)).list().await.unwrap_err();
        assert_eq!(err.client_message(), "Failed to list users");
    }

    #[tokio::test]
    async fn test_login_with_password() {
        let service = service();
        let principal = service.build_principal("a@b.com", "Secret1!").await.unwrap();
        service.register(principal.clone()).await.unwrap();

        let (found, token) = service
            .login_with_password("a@b.com", "Secret1!")
            .await
            .unwrap();
        assert_eq!(found.id, principal.id);
        assert!(service.codec().decode(&token).is_ok());

        for (email, password) in [("a@b.com", "Secret2!"), ("ghost@b.com", "Secret1!")] {
            assert!(matches!(
                service.login_with_password(email, password).await,
                Err(IdentityError::InvalidCredentials)
            ));
        }
    }

    #[tokio::test]
    async fn test_magic_login_not_enabled() {
        let service = service();
        let principal = Principal::new("a@b.com", "hash");
        for presented in ["", "abc123", "anything"] {
            assert!(matches!(
                service.magic_login(&principal, presented).await,
                Err(IdentityError::MagicLoginNotEnabled(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_magic_login_match_and_mismatch() {
        let service = service();
        let principal = Principal::new("a@b.com", "hash").with_magic_login_token("abc123");

        let token = service.magic_login(&principal, "abc123").await.unwrap();
        assert!(service.codec().decode(&token).is_ok());

        assert!(matches!(
            service.magic_login(&principal, "abc124").await,
            Err(IdentityError::MagicLoginMismatch(_))
        ));

        // the stored token still works afterwards
        assert!(service.magic_login(&principal, "abc123").await.is_ok());
    }

    #[tokio::test]
    async fn test_login_never_touches_store() {
        let store = MockStore::new();
        let service = service_with(Arc::new(store));
        let hash = service.verifier().hash("Secret1!").unwrap();
        let principal = Principal::new("a@b.com", hash);

        assert!(service.login(&principal, "Secret1!").await.is_ok());
    }

    #[tokio::test]
    async fn test_provision_and_list() {
        let service = service();
        let created = service.provision("new@b.com", true).await.unwrap();
        assert!(created.is_admin);
        assert!(created.password_hash.starts_with("$argon2id$"));

        let all = service.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, created.id);

        assert!(matches!(
            service.provision("NEW@b.com", false).await,
            Err(IdentityError::Conflict(_))
        ));
    }
}
