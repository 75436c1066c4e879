//! Security configuration consumed at startup.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use warden_auth::{AllowList, AllowListError, TokenSettings, TokenSettingsError};

/// Login endpoint; always allow-listed regardless of configuration.
pub const LOGIN_ENDPOINT: &str = "POST /auth/login";

/// Default bound on a single credential store lookup.
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;

/// Startup configuration that cannot be served.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid unsecured endpoint list: {0}")]
    AllowList(#[from] AllowListError),

    #[error("invalid token settings: {0}")]
    Token(#[from] TokenSettingsError),
}

/// Security settings: token signing, public endpoints, store timeout.
///
/// Immutable after startup; handlers only ever see it through `Arc`s.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub token: TokenSettings,

    /// `[METHOD ]<pattern>` entries reachable without a token.
    #[serde(default = "default_unsecured_endpoints")]
    pub unsecured_endpoints: Vec<String>,

    /// Let `OPTIONS` requests through unauthenticated.
    #[serde(default = "default_true")]
    pub permit_preflight: bool,

    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
}

fn default_unsecured_endpoints() -> Vec<String> {
    vec!["GET /health".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_store_timeout_ms() -> u64 {
    DEFAULT_STORE_TIMEOUT_MS
}

impl SecurityConfig {
    pub fn new(token: TokenSettings) -> Self {
        Self {
            token,
            unsecured_endpoints: default_unsecured_endpoints(),
            permit_preflight: true,
            store_timeout_ms: DEFAULT_STORE_TIMEOUT_MS,
        }
    }

    /// Configured entries plus the login endpoint.
    pub fn allow_list(&self) -> Result<AllowList, AllowListError> {
        let entries = std::iter::once(LOGIN_ENDPOINT)
            .chain(self.unsecured_endpoints.iter().map(String::as_str))
            .filter(|e| !e.trim().is_empty());
        Ok(AllowList::parse(entries)?.with_preflight(self.permit_preflight))
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}
