use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::app::dto::{AuthenticationResponse, LoginRequest};
use crate::app::errors;
use crate::app::services::AppServices;

/// `POST /auth/login`: exchange credentials for a bearer token.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> Response {
    match services
        .authenticator
        .authenticate(&body.username, &body.password, Utc::now())
        .await
    {
        Ok(session) => Json(AuthenticationResponse {
            access_token: session.access_token,
        })
        .into_response(),
        Err(e) => errors::login_error_to_response(e),
    }
}
