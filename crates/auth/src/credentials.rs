//! Credential store contract and the record it returns.
//!
//! Persistence is owned elsewhere (`warden-infra`); the auth core only reads
//! records by username.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use warden_core::{Entity, UserId, Username};

use crate::{AuthoritySet, Role};

/// A stored user account, read-only to the auth core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub id: UserId,
    pub username: Username,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Argon2 PHC string (`$argon2id$v=19$...`).
    pub password_hash: String,
    pub enabled: bool,
    pub roles: BTreeSet<Role>,
}

impl CredentialRecord {
    /// One `ROLE_<name>` authority per assigned role.
    pub fn authorities(&self) -> AuthoritySet {
        self.roles.iter().map(Role::authority).collect()
    }
}

impl Entity for CredentialRecord {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialStoreError {
    /// The backing store could not be reached or returned an error.
    #[error("credential store unavailable: {0}")]
    Unavailable(String),

    /// A stored row could not be mapped to a [`CredentialRecord`].
    #[error("corrupt credential record: {0}")]
    Corrupt(String),
}

/// Lookup-by-username contract.
///
/// This is the only suspend point in the auth core. Callers are expected to
/// bound it with a timeout; implementations must not retry on their own.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, CredentialStoreError>;
}

#[async_trait::async_trait]
impl<S> CredentialStore for Arc<S>
where
    S: CredentialStore + ?Sized,
{
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, CredentialStoreError> {
        (**self).find_by_username(username).await
    }
}
