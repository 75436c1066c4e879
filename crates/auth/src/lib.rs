//! `warden-auth`: stateless authentication/authorization core.
//!
//! This crate is intentionally decoupled from HTTP and storage: tokens are
//! issued and parsed in memory, credentials come through the
//! [`CredentialStore`] contract, and the HTTP layer only feeds in header values.

pub mod allow_list;
pub mod authority;
pub mod authorize;
pub mod claims;
pub mod credentials;
pub mod filter;
pub mod identity;
pub mod login;
pub mod password;
pub mod roles;
pub mod token;

pub use allow_list::{AllowList, AllowListError, AllowRule};
pub use authority::{Authority, AuthoritySet};
pub use authorize::{AccessError, Policy, authorize, check_access};
pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use credentials::{CredentialRecord, CredentialStore, CredentialStoreError};
pub use filter::{AuthOutcome, RequestAuthenticator, TokenType, extract_bearer};
pub use identity::{GrantedAuthorities, Identity, display_name};
pub use login::{AuthenticatedSession, Authenticator, LoginError};
pub use password::{Argon2PasswordEncoder, PasswordEncoder, PasswordError};
pub use roles::{ROLE_PREFIX, Role, authority_for_role, role_for_authority};
pub use token::{
    DEFAULT_EXPIRATION_MILLIS, Hs256TokenCodec, TokenCodec, TokenError, TokenSettings,
    TokenSettingsError,
};
