use crate::models::Principal;
use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use error_common::{codes, Categorized, ErrorCategory};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Another principal already holds this identity
    #[error("Duplicate principal: {0}")]
    Conflict(String),

    #[error("Principal not found: {0}")]
    NotFound(String),

    #[error("Store backend failure: {0}")]
    Backend(String),
}

impl Categorized for StoreError {
    fn category(&self) -> ErrorCategory {
        match self {
            StoreError::Conflict(_) => ErrorCategory::Conflict,
            StoreError::NotFound(_) => ErrorCategory::Authentication,
            StoreError::Backend(_) => ErrorCategory::Internal,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            StoreError::Conflict(_) => codes::conflict::DUPLICATE_IDENTITY,
            StoreError::NotFound(_) => codes::authentication::PRINCIPAL_NOT_FOUND,
            StoreError::Backend(_) => codes::internal::STORE_FAILURE,
        }
    }
}

/// Persistence seam for principals.
///
/// Implementations own duplicate detection: `add` must report an existing
/// email (compared case-insensitively) or id as [`StoreError::Conflict`].
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    async fn add(&self, principal: Principal) -> Result<(), StoreError>;
    async fn get(&self, id: &str) -> Result<Principal, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, StoreError>;
    async fn list(&self) -> Result<Vec<Principal>, StoreError>;
    async fn update(&self, principal: Principal) -> Result<(), StoreError>;
}

/// In-memory store for development and tests
#[derive(Debug, Default)]
pub struct InMemoryPrincipalStore {
    principals: DashMap<String, Principal>,
    // lowercased email -> id
    emails: DashMap<String, String>,
}

impl InMemoryPrincipalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.principals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.principals.is_empty()
    }
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl PrincipalStore for InMemoryPrincipalStore {
    async fn add(&self, principal: Principal) -> Result<(), StoreError> {
        if self.principals.contains_key(&principal.id) {
            return Err(StoreError::Conflict(principal.id));
        }

        // Reserving the email slot is the uniqueness check; the principal is
        // inserted after the entry lock is released.
        match self.emails.entry(email_key(&principal.email)) {
            Entry::Occupied(entry) => Err(StoreError::Conflict(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(principal.id.clone());
                self.principals.insert(principal.id.clone(), principal);
                Ok(())
            }
        }
    }

    async fn get(&self, id: &str) -> Result<Principal, StoreError> {
        self.principals
            .get(id)
            .map(|p| p.value().clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, StoreError> {
        let Some(id) = self.emails.get(&email_key(email)).map(|id| id.value().clone()) else {
            return Ok(None);
        };
        Ok(self.principals.get(&id).map(|p| p.value().clone()))
    }

    async fn list(&self) -> Result<Vec<Principal>, StoreError> {
        let mut principals: Vec<Principal> =
            self.principals.iter().map(|p| p.value().clone()).collect();
        principals.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(principals)
    }

    async fn update(&self, principal: Principal) -> Result<(), StoreError> {
        let previous_email = self
            .principals
            .get(&principal.id)
            .map(|p| email_key(&p.email))
            .ok_or_else(|| StoreError::NotFound(principal.id.clone()))?;

        let new_email = email_key(&principal.email);
        if new_email != previous_email {
            match self.emails.entry(new_email) {
                Entry::Occupied(entry) if entry.get() != &principal.id => {
                    return Err(StoreError::Conflict(entry.key().clone()));
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(entry) => {
                    entry.insert(principal.id.clone());
                }
            }
            self.emails.remove(&previous_email);
        }

        self.principals.insert(principal.id.clone(), principal);
        Ok(())
    }
}
