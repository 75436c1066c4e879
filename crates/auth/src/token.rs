//! Session token codec (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::claims::{SessionClaims, TokenValidationError, validate_claims};
use crate::Identity;

/// Default token lifetime: 7 days, in milliseconds.
pub const DEFAULT_EXPIRATION_MILLIS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Why a token was rejected (or could not be produced).
///
/// The variants stay distinct for logging only. At the HTTP boundary every
/// parse failure becomes the same "unauthenticated" response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token signature mismatch")]
    SignatureInvalid,

    #[error("token has expired")]
    Expired,

    #[error("token signing failed: {0}")]
    Signing(String),
}

impl TokenError {
    /// Short, stable label for structured logs.
    pub fn reason(&self) -> &'static str {
        match self {
            TokenError::Malformed(_) => "malformed",
            TokenError::SignatureInvalid => "signature_invalid",
            TokenError::Expired => "expired",
            TokenError::Signing(_) => "signing_failed",
        }
    }
}

/// Rejected token settings, reported once at startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenSettingsError {
    #[error("token expiration must be positive, got {0}ms")]
    NonPositiveExpiration(i64),

    #[error("token expiration of {0}ms is out of range")]
    ExpirationOutOfRange(i64),
}

/// Token signing settings, fixed at startup.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenSettings {
    /// Shared HMAC secret.
    pub secret: String,

    /// Lifetime of an issued token in milliseconds.
    #[serde(default = "default_expiration_millis")]
    pub expiration_millis: i64,
}

fn default_expiration_millis() -> i64 {
    DEFAULT_EXPIRATION_MILLIS
}

impl TokenSettings {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiration_millis: DEFAULT_EXPIRATION_MILLIS,
        }
    }

    pub fn with_expiration_millis(mut self, millis: i64) -> Self {
        self.expiration_millis = millis;
        self
    }

    /// Token lifetime, if it is positive and a token issued now can carry it.
    pub fn validate(&self) -> Result<Duration, TokenSettingsError> {
        let millis = self.expiration_millis;
        if millis <= 0 {
            return Err(TokenSettingsError::NonPositiveExpiration(millis));
        }
        Duration::try_milliseconds(millis)
            .filter(|lifetime| Utc::now().checked_add_signed(*lifetime).is_some())
            .ok_or(TokenSettingsError::ExpirationOutOfRange(millis))
    }
}

impl core::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"<redacted>")
            .field("expiration_millis", &self.expiration_millis)
            .finish()
    }
}

/// Issues and parses self-contained session tokens.
///
/// Both operations are pure CPU work. `now` is supplied by the caller so that
/// issuance and validation share one clock source.
pub trait TokenCodec: Send + Sync {
    fn issue(&self, identity: &Identity, now: DateTime<Utc>) -> Result<String, TokenError>;

    fn parse(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError>;
}

/// HMAC-SHA256 signed JWT codec.
///
/// Keys are immutable after construction; share the codec behind an `Arc`.
#[derive(Clone)]
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiration: Duration,
}

impl Hs256TokenCodec {
    pub fn new(secret: impl AsRef<[u8]>, expiration: Duration) -> Self {
        let secret = secret.as_ref();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            expiration,
        }
    }

    pub fn from_settings(settings: &TokenSettings) -> Result<Self, TokenSettingsError> {
        let expiration = settings.validate()?;
        Ok(Self::new(settings.secret.as_bytes(), expiration))
    }

    pub fn expiration(&self) -> Duration {
        self.expiration
    }

    fn validation(verify_signature: bool) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry lives in `expires_at` and is checked by `validate_claims`.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        if !verify_signature {
            validation.insecure_disable_signature_validation();
        }
        validation
    }
}

impl TokenCodec for Hs256TokenCodec {
    fn issue(&self, identity: &Identity, now: DateTime<Utc>) -> Result<String, TokenError> {
        let expires_at = now
            .checked_add_signed(self.expiration)
            .ok_or_else(|| TokenError::Signing("token expiry out of range".to_string()))?;
        let claims = SessionClaims::for_identity(identity, now, expires_at);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn parse(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError> {
        // Expiry is judged on the decoded payload first, so an expired token
        // reports `Expired` whether or not its signature holds.
        let unverified = decode::<SessionClaims>(token, &self.decoding, &Self::validation(false))
            .map_err(|e| TokenError::Malformed(e.to_string()))?;

        validate_claims(&unverified.claims, now).map_err(|e| match e {
            TokenValidationError::Expired => TokenError::Expired,
            TokenValidationError::InvalidTimeWindow => TokenError::Malformed(e.to_string()),
        })?;

        let verified = decode::<SessionClaims>(token, &self.decoding, &Self::validation(true))
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::SignatureInvalid
                }
                _ => TokenError::Malformed(e.to_string()),
            })?;

        Ok(verified.claims.into_identity())
    }
}
