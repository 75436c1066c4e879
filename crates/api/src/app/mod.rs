//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: token codec, password encoder, credential store
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use warden_auth::RequestAuthenticator;

use crate::config::{ConfigError, SecurityConfig};
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::SharedStore;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Fails if the allow-list does not parse or the token lifetime is unusable.
pub fn build_app(config: &SecurityConfig, store: SharedStore) -> Result<Router, ConfigError> {
    let services = Arc::new(services::build_services(config, store)?);

    let allow_list = config.allow_list()?;
    tracing::info!(rules = allow_list.len(), "allow-list loaded");

    let auth_state = middleware::AuthState {
        authenticator: RequestAuthenticator::new(services.tokens.clone(), allow_list),
    };

    Ok(routes::router()
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    auth_state,
                    middleware::auth_middleware,
                ))
                .layer(Extension(services)),
        ))
}
