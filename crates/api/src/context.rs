use warden_auth::Identity;

/// Authenticated identity bound to the current request.
///
/// Inserted by the auth middleware; handlers read it through `Extension`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext(Identity);

impl IdentityContext {
    pub fn new(identity: Identity) -> Self {
        Self(identity)
    }

    pub fn identity(&self) -> &Identity {
        &self.0
    }
}

/// Marker for requests that matched the allow-list and skipped authentication.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PublicAccess;
