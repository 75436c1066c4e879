use axum::{
    Router,
    routing::{get, post},
};

use warden_auth::Policy;

use crate::authz::require_policy;

pub mod auth;
pub mod profile;
pub mod system;

pub fn router() -> Router {
    let admin = Router::new()
        .route("/admin/status", get(profile::admin_status))
        .route_layer(axum::middleware::from_fn_with_state(
            Policy::has_role("ADMIN"),
            require_policy,
        ));

    Router::new()
        .route("/health", get(system::health))
        .route("/auth/login", post(auth::login))
        .route("/me", get(profile::me))
        .merge(admin)
}
