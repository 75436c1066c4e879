use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use warden_core::{UserId, Username};

use crate::{AuthoritySet, Identity};

/// Session token claims (transport-agnostic).
///
/// Everything needed to rebuild an [`Identity`] without touching the
/// credential store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject / user identifier.
    pub sub: UserId,

    pub username: Username,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    pub display_name: String,

    /// Authorities granted at issuance time.
    #[serde(default)]
    pub authorities: AuthoritySet,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,

    /// Unique token id; two tokens for the same identity never collide.
    pub jti: Uuid,
}

impl SessionClaims {
    pub fn for_identity(identity: &Identity, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: identity.id().clone(),
            username: identity.username().clone(),
            first_name: identity.first_name().map(str::to_string),
            last_name: identity.last_name().map(str::to_string),
            display_name: identity.display_name().to_string(),
            authorities: identity.authorities().clone(),
            issued_at,
            expires_at,
            jti: Uuid::new_v4(),
        }
    }

    pub fn into_identity(self) -> Identity {
        Identity::from_parts(
            self.sub,
            self.username,
            self.first_name,
            self.last_name,
            self.display_name,
            self.authorities,
        )
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token time window (expires_at < issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate the time window of session claims.
///
/// Exact wall-clock compare, no leeway: a token is expired once `now` is past
/// `expires_at`. Signature verification happens elsewhere.
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at < claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now > claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
