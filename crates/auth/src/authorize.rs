//! Authorization gate: per-endpoint policy evaluation.

use std::sync::Arc;

use thiserror::Error;

use crate::{AuthOutcome, Authority, AuthoritySet, GrantedAuthorities, Identity};

/// Access-control requirement declared by an endpoint.
#[derive(Clone)]
pub enum Policy {
    /// Any authenticated identity.
    Authenticated,
    /// Must hold this authority.
    HasAuthority(Authority),
    /// Must hold at least one of these authorities.
    HasAnyAuthority(Vec<Authority>),
    /// Must hold every one of these authorities.
    HasAllAuthorities(Vec<Authority>),
    /// Arbitrary predicate over the authority set.
    Predicate(Arc<dyn Fn(&AuthoritySet) -> bool + Send + Sync>),
}

impl Policy {
    /// Shorthand for `HasAuthority(ROLE_<role>)`.
    pub fn has_role(role: &str) -> Self {
        Policy::HasAuthority(crate::authority_for_role(role))
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&AuthoritySet) -> bool + Send + Sync + 'static,
    {
        Policy::Predicate(Arc::new(f))
    }

    pub fn permits(&self, authorities: &AuthoritySet) -> bool {
        match self {
            Policy::Authenticated => true,
            Policy::HasAuthority(a) => authorities.contains(a),
            Policy::HasAnyAuthority(any) => any.iter().any(|a| authorities.contains(a)),
            Policy::HasAllAuthorities(all) => all.iter().all(|a| authorities.contains(a)),
            Policy::Predicate(f) => f(authorities),
        }
    }
}

impl core::fmt::Debug for Policy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Policy::Authenticated => f.write_str("Authenticated"),
            Policy::HasAuthority(a) => write!(f, "HasAuthority({a})"),
            Policy::HasAnyAuthority(any) => f.debug_tuple("HasAnyAuthority").field(any).finish(),
            Policy::HasAllAuthorities(all) => f.debug_tuple("HasAllAuthorities").field(all).finish(),
            Policy::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// No usable identity (HTTP 401).
    #[error("unauthenticated")]
    Unauthenticated,

    /// Identity present but the policy refused it (HTTP 403).
    #[error("forbidden: policy {0} not satisfied")]
    Unauthorized(String),
}

/// Check a principal against a policy.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize<P>(principal: &P, policy: &Policy) -> Result<(), AccessError>
where
    P: GrantedAuthorities + ?Sized,
{
    if policy.permits(principal.authorities()) {
        Ok(())
    } else {
        tracing::info!(username = principal.username(), ?policy, "access denied");
        Err(AccessError::Unauthorized(format!("{policy:?}")))
    }
}

/// Full gate decision for one request.
///
/// Returns the identity business logic runs as (`None` for public endpoints).
/// A failed token always means `Unauthenticated`, never a fallback to anonymous.
pub fn check_access<'a>(
    outcome: &'a AuthOutcome,
    policy: &Policy,
) -> Result<Option<&'a Identity>, AccessError> {
    match outcome {
        AuthOutcome::Public => Ok(None),
        AuthOutcome::Anonymous | AuthOutcome::Failed(_) => Err(AccessError::Unauthenticated),
        AuthOutcome::Authenticated(identity) => {
            authorize(identity, policy)?;
            Ok(Some(identity))
        }
    }
}
