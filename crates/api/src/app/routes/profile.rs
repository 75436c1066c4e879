use axum::{
    Json,
    extract::Extension,
    response::{IntoResponse, Response},
};
use serde_json::json;

use warden_auth::AccessError;

use crate::app::dto::UserProfile;
use crate::app::errors::access_error_to_response;
use crate::context::IdentityContext;

/// No identity means the path was allow-listed; these routes still need one.
fn require_identity(ctx: Option<Extension<IdentityContext>>) -> Result<IdentityContext, Response> {
    ctx.map(|Extension(ctx)| ctx)
        .ok_or_else(|| access_error_to_response(AccessError::Unauthenticated))
}

pub async fn me(ctx: Option<Extension<IdentityContext>>) -> Response {
    match require_identity(ctx) {
        Ok(ctx) => Json(UserProfile::from(ctx.identity())).into_response(),
        Err(resp) => resp,
    }
}

/// Reachable only with `ROLE_ADMIN`.
pub async fn admin_status(ctx: Option<Extension<IdentityContext>>) -> Response {
    match require_identity(ctx) {
        Ok(ctx) => Json(json!({
            "status": "ok",
            "username": ctx.identity().username().to_string(),
        }))
        .into_response(),
        Err(resp) => resp,
    }
}
