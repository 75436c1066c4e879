use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Authority;

/// Prefix prepended to a role name to form its authority string.
pub const ROLE_PREFIX: &str = "ROLE_";

/// Role identifier as stored with a credential record (e.g. `"ADMIN"`).
///
/// Roles are opaque names at this layer; access checks compare the derived
/// [`Authority`], never the role itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The authority granted by holding this role.
    pub fn authority(&self) -> Authority {
        authority_for_role(self.as_str())
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Map a role name to its authority string: `ROLE_<name>`, name taken verbatim.
pub fn authority_for_role(role: &str) -> Authority {
    Authority::new(format!("{ROLE_PREFIX}{role}"))
}

/// Inverse of [`authority_for_role`]; `None` for authorities not derived from a role.
pub fn role_for_authority(authority: &Authority) -> Option<Role> {
    authority
        .as_str()
        .strip_prefix(ROLE_PREFIX)
        .map(|name| Role::new(name.to_string()))
}
