//! Authenticated principal snapshot.

use warden_core::{UserId, Username};

use crate::{Authority, AuthoritySet, CredentialRecord};

/// Minimal "credentials + authorities" capability the authorization gate needs.
///
/// Anything that can name its user and list its granted authorities can be
/// checked against a [`crate::Policy`].
pub trait GrantedAuthorities {
    fn username(&self) -> &str;

    fn authorities(&self) -> &AuthoritySet;

    fn has_authority(&self, authority: &Authority) -> bool {
        self.authorities().contains(authority)
    }
}

/// Detached, request-scoped snapshot of an authenticated user.
///
/// Built fresh per login or per validated token and never mutated. It keeps no
/// reference to the credential record, so role edits made while a token is
/// live do not show up until the user logs in again.
///
/// Equality and hashing use `(id, username)` only: two snapshots of the same
/// user are equal even if their authority sets differ.
#[derive(Debug, Clone)]
pub struct Identity {
    id: UserId,
    username: Username,
    first_name: Option<String>,
    last_name: Option<String>,
    display_name: String,
    authorities: AuthoritySet,
}

impl Identity {
    /// Build an identity; the display name is derived from the name parts.
    pub fn new(
        id: UserId,
        username: Username,
        first_name: Option<String>,
        last_name: Option<String>,
        authorities: AuthoritySet,
    ) -> Self {
        let display_name = display_name(first_name.as_deref(), last_name.as_deref());
        Self {
            id,
            username,
            first_name,
            last_name,
            display_name,
            authorities,
        }
    }

    /// Rebuild an identity from parts carried in a token, keeping the display
    /// name exactly as it was issued.
    pub(crate) fn from_parts(
        id: UserId,
        username: Username,
        first_name: Option<String>,
        last_name: Option<String>,
        display_name: String,
        authorities: AuthoritySet,
    ) -> Self {
        Self {
            id,
            username,
            first_name,
            last_name,
            display_name,
            authorities,
        }
    }

    pub fn from_record(record: &CredentialRecord) -> Self {
        Self::new(
            record.id.clone(),
            record.username.clone(),
            record.first_name.clone(),
            record.last_name.clone(),
            record.authorities(),
        )
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn authorities(&self) -> &AuthoritySet {
        &self.authorities
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.username == other.username
    }
}

impl Eq for Identity {}

impl core::hash::Hash for Identity {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.username.hash(state);
    }
}

impl GrantedAuthorities for Identity {
    fn username(&self) -> &str {
        self.username.as_str()
    }

    fn authorities(&self) -> &AuthoritySet {
        &self.authorities
    }
}

/// `"<first> <last>"` with each part trimmed and missing parts as empty strings.
///
/// The separator is always emitted: a missing last name yields `"<first> "`
/// with a trailing space, and two missing parts yield `" "`.
pub fn display_name(first: Option<&str>, last: Option<&str>) -> String {
    let first = first.unwrap_or_default().trim();
    let last = last.unwrap_or_default().trim();
    format!("{first} {last}")
}
