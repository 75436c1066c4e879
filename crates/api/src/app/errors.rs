use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use warden_auth::{AccessError, LoginError};

pub const UNAUTHENTICATED_MESSAGE: &str = "Full authentication is required to access this resource";
pub const FORBIDDEN_MESSAGE: &str = "Access is denied";

/// Token failures all land here with the same body; the sub-reason is only logged.
pub fn access_error_to_response(err: AccessError) -> axum::response::Response {
    match err {
        AccessError::Unauthenticated => json_error(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            UNAUTHENTICATED_MESSAGE,
        ),
        AccessError::Unauthorized(_) => {
            json_error(StatusCode::FORBIDDEN, "forbidden", FORBIDDEN_MESSAGE)
        }
    }
}

pub fn login_error_to_response(err: LoginError) -> axum::response::Response {
    match err {
        LoginError::InvalidCredentials | LoginError::AccountDisabled => {
            json_error(StatusCode::UNAUTHORIZED, "authentication_failed", err.to_string())
        }
        LoginError::Store(_) => service_unavailable(),
        LoginError::Token(e) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "token_error",
            e.reason(),
        ),
        LoginError::Verification(_) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "login could not be completed",
        ),
    }
}

pub fn service_unavailable() -> axum::response::Response {
    json_error(
        StatusCode::SERVICE_UNAVAILABLE,
        "service_unavailable",
        "credential store unavailable",
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
