//! Per-route authorization gate.
//!
//! Runs after [`crate::middleware::auth_middleware`] has bound the identity,
//! and before the handler.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use warden_auth::{AccessError, Policy, authorize};

use crate::app::errors::access_error_to_response;
use crate::context::{IdentityContext, PublicAccess};

/// Enforce `policy` for the wrapped routes.
///
/// Allow-listed requests pass through unchanged; a request with neither marker
/// never went through the auth middleware and is refused.
pub async fn require_policy(State(policy): State<Policy>, req: Request, next: Next) -> Response {
    if req.extensions().get::<PublicAccess>().is_some() {
        return next.run(req).await;
    }

    let Some(ctx) = req.extensions().get::<IdentityContext>() else {
        return access_error_to_response(AccessError::Unauthenticated);
    };

    if let Err(e) = authorize(ctx.identity(), &policy) {
        return access_error_to_response(e);
    }

    next.run(req).await
}
