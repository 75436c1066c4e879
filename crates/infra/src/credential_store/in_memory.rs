use std::collections::{BTreeSet, HashMap};
use std::sync::{RwLock, RwLockWriteGuard};

use warden_auth::{
    CredentialRecord, CredentialStore, CredentialStoreError, PasswordEncoder, Role,
};
use warden_core::{UserId, Username};

/// In-memory credential store for tests/dev.
///
/// Keyed by username; inserting a record with an existing username replaces it.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    inner: RwLock<HashMap<String, CredentialRecord>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, HashMap<String, CredentialRecord>>, CredentialStoreError> {
        self.inner
            .write()
            .map_err(|_| CredentialStoreError::Unavailable("lock poisoned".to_string()))
    }

    pub fn upsert(&self, record: CredentialRecord) -> Result<(), CredentialStoreError> {
        self.write()?.insert(record.username.to_string(), record);
        Ok(())
    }

    pub fn remove(&self, username: &str) -> Result<Option<CredentialRecord>, CredentialStoreError> {
        Ok(self.write()?.remove(username))
    }

    /// Hash `password` and store a new enabled user with the given roles.
    pub fn register(
        &self,
        encoder: &dyn PasswordEncoder,
        username: &str,
        password: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
        roles: &[&str],
    ) -> anyhow::Result<CredentialRecord> {
        let record = CredentialRecord {
            id: UserId::generate(),
            username: Username::new(username)?,
            first_name: first_name.map(str::to_string),
            last_name: last_name.map(str::to_string),
            password_hash: encoder.encode(password)?,
            enabled: true,
            roles: roles
                .iter()
                .map(|r| Role::new(r.to_string()))
                .collect::<BTreeSet<_>>(),
        };
        self.upsert(record.clone())?;
        Ok(record)
    }

    /// Flip the enabled flag; `Ok(false)` if the user does not exist.
    pub fn set_enabled(&self, username: &str, enabled: bool) -> Result<bool, CredentialStoreError> {
        Ok(match self.write()?.get_mut(username) {
            Some(record) => {
                record.enabled = enabled;
                true
            }
            None => false,
        })
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, CredentialStoreError> {
        let map = self
            .inner
            .read()
            .map_err(|_| CredentialStoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(map.get(username).cloned())
    }
}
