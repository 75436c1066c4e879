//! Per-request authentication (transport-agnostic).
//!
//! The HTTP layer hands over method, path and the raw `Authorization` header
//! value; this module decides whether the request is public, anonymous,
//! authenticated, or carries a token that failed validation.

use core::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{AllowList, Identity, TokenCodec, TokenError};

/// Authorization header schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Basic,
    Bearer,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Basic => "Basic",
            TokenType::Bearer => "Bearer",
        }
    }
}

impl FromStr for TokenType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("bearer") {
            Ok(TokenType::Bearer)
        } else if s.eq_ignore_ascii_case("basic") {
            Ok(TokenType::Basic)
        } else {
            Err(())
        }
    }
}

impl core::fmt::Display for TokenType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pull the token out of a `Bearer <token>` header value.
///
/// Any other scheme, or an empty token, yields `None`.
pub fn extract_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    match scheme.parse::<TokenType>() {
        Ok(TokenType::Bearer) => {
            let token = token.trim();
            (!token.is_empty()).then_some(token)
        }
        _ => None,
    }
}

/// What the filter learned about a request.
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    /// Allow-listed: authentication was skipped.
    Public,
    /// No bearer token supplied.
    Anonymous,
    /// A valid token was supplied.
    Authenticated(Identity),
    /// A token was supplied but rejected.
    Failed(TokenError),
}

impl AuthOutcome {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthOutcome::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }
}

/// Runs once per request, before any authorization decision.
#[derive(Clone)]
pub struct RequestAuthenticator {
    tokens: Arc<dyn TokenCodec>,
    allow_list: Arc<AllowList>,
}

impl RequestAuthenticator {
    pub fn new(tokens: Arc<dyn TokenCodec>, allow_list: AllowList) -> Self {
        Self {
            tokens,
            allow_list: Arc::new(allow_list),
        }
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// Allow-list first; only non-public requests have their token read.
    pub fn authenticate(
        &self,
        method: &str,
        path: &str,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> AuthOutcome {
        if self.allow_list.is_allowed(method, path) {
            return AuthOutcome::Public;
        }

        let Some(token) = authorization.and_then(extract_bearer) else {
            return AuthOutcome::Anonymous;
        };

        match self.tokens.parse(token, now) {
            Ok(identity) => AuthOutcome::Authenticated(identity),
            Err(e) => {
                tracing::debug!(method, path, reason = e.reason(), "bearer token rejected");
                AuthOutcome::Failed(e)
            }
        }
    }
}
