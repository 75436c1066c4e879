//! Credential verification: username + password in, identity + token out.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    CredentialRecord, CredentialStore, CredentialStoreError, Identity, PasswordEncoder, TokenCodec,
    TokenError,
};

/// Login failure taxonomy.
///
/// `InvalidCredentials` covers both "no such user" and "wrong password" so a
/// caller cannot discover which usernames exist.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoginError {
    #[error("Bad credentials")]
    InvalidCredentials,

    #[error("User is disabled")]
    AccountDisabled,

    /// The store failed; never reported as a credential problem.
    #[error(transparent)]
    Store(#[from] CredentialStoreError),

    #[error(transparent)]
    Token(#[from] TokenError),

    /// The blocking password check could not be run to completion.
    #[error("password verification failed: {0}")]
    Verification(String),
}

/// Successful login result.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub identity: Identity,
    pub access_token: String,
}

/// Verifies submitted credentials against a [`CredentialStore`] and issues a
/// session token on success.
///
/// Stateless: nothing about the session is remembered after `authenticate` returns.
pub struct Authenticator<S> {
    store: S,
    passwords: Arc<dyn PasswordEncoder>,
    tokens: Arc<dyn TokenCodec>,
    store_timeout: Option<Duration>,
}

impl<S> Authenticator<S>
where
    S: CredentialStore,
{
    pub fn new(store: S, passwords: Arc<dyn PasswordEncoder>, tokens: Arc<dyn TokenCodec>) -> Self {
        Self {
            store,
            passwords,
            tokens,
            store_timeout: None,
        }
    }

    /// Bound the credential lookup. Password hashing is not covered.
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = Some(timeout);
        self
    }

    async fn lookup(&self, username: &str) -> Result<Option<CredentialRecord>, CredentialStoreError> {
        let Some(limit) = self.store_timeout else {
            return self.store.find_by_username(username).await;
        };

        match tokio::time::timeout(limit, self.store.find_by_username(username)).await {
            Ok(result) => result,
            Err(_) => Err(CredentialStoreError::Unavailable(format!(
                "credential lookup timed out after {}ms",
                limit.as_millis()
            ))),
        }
    }

    /// Argon2 runs on the blocking pool, never on an async worker.
    async fn verify(&self, password: &str, hash: Option<String>) -> Result<bool, LoginError> {
        let passwords = self.passwords.clone();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || match hash {
            Some(hash) => passwords.matches(&password, &hash),
            None => {
                passwords.mitigate_timing(&password);
                false
            }
        })
        .await
        .map_err(|e| LoginError::Verification(e.to_string()))
    }

    /// Lookup → password check → enabled check → issue.
    ///
    /// A disabled account with a wrong password still reports
    /// `InvalidCredentials`: the enabled flag is only revealed to callers who
    /// already know the password.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthenticatedSession, LoginError> {
        let record = match self.lookup(username).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                self.verify(password, None).await?;
                tracing::warn!(username, "login rejected: bad credentials");
                return Err(LoginError::InvalidCredentials);
            }
            Err(e) => {
                tracing::error!(username, error = %e, "login aborted: credential store failure");
                return Err(LoginError::Store(e));
            }
        };

        if !self.verify(password, Some(record.password_hash.clone())).await? {
            tracing::warn!(username, "login rejected: bad credentials");
            return Err(LoginError::InvalidCredentials);
        }

        if !record.enabled {
            tracing::warn!(username, "login rejected: account disabled");
            return Err(LoginError::AccountDisabled);
        }

        let identity = Identity::from_record(&record);
        let access_token = self.tokens.issue(&identity, now)?;

        tracing::info!(user_id = %identity.id(), username, "login succeeded");

        Ok(AuthenticatedSession {
            identity,
            access_token,
        })
    }
}
