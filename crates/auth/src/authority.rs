use std::borrow::Cow;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Granted authority string (e.g. `"ROLE_ADMIN"`).
///
/// The unit of access-control comparison. Authorities are compared by exact
/// string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Authority(Cow<'static, str>);

impl Authority {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Authority {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Authority {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

/// Unique, unordered set of authorities held by an identity.
///
/// Backed by a `BTreeSet` so serialized tokens list authorities in a stable order.
pub type AuthoritySet = BTreeSet<Authority>;
