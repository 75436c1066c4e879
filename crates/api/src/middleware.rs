use axum::{
    extract::State,
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use warden_auth::{AuthOutcome, Policy, RequestAuthenticator, check_access};

use crate::app::errors::access_error_to_response;
use crate::context::{IdentityContext, PublicAccess};

#[derive(Clone)]
pub struct AuthState {
    pub authenticator: RequestAuthenticator,
}

/// Request filter: allow-list, then bearer token, then bind the identity.
///
/// Every non-public request must carry a valid token. A present but invalid
/// token is rejected outright, never treated as anonymous.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let outcome = state.authenticator.authenticate(
        req.method().as_str(),
        req.uri().path(),
        header,
        Utc::now(),
    );

    match check_access(&outcome, &Policy::Authenticated) {
        Ok(Some(identity)) => {
            let ctx = IdentityContext::new(identity.clone());
            req.extensions_mut().insert(ctx);
        }
        Ok(None) => {
            req.extensions_mut().insert(PublicAccess);
        }
        Err(e) => {
            if let AuthOutcome::Failed(reason) = &outcome {
                tracing::debug!(path = req.uri().path(), reason = reason.reason(), "unauthenticated");
            }
            return access_error_to_response(e);
        }
    }

    next.run(req).await
}
