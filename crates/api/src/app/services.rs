//! Shared handler state.

use std::sync::Arc;

use warden_auth::{
    Argon2PasswordEncoder, Authenticator, CredentialStore, Hs256TokenCodec, TokenCodec,
    TokenSettingsError,
};

use crate::config::SecurityConfig;

pub type SharedStore = Arc<dyn CredentialStore>;

pub struct AppServices {
    pub authenticator: Authenticator<SharedStore>,
    pub tokens: Arc<dyn TokenCodec>,
}

pub fn build_services(
    config: &SecurityConfig,
    store: SharedStore,
) -> Result<AppServices, TokenSettingsError> {
    let tokens: Arc<dyn TokenCodec> = Arc::new(Hs256TokenCodec::from_settings(&config.token)?);
    let passwords = Arc::new(Argon2PasswordEncoder::new());
    let authenticator = Authenticator::new(store, passwords, tokens.clone())
        .with_store_timeout(config.store_timeout());

    Ok(AppServices {
        authenticator,
        tokens,
    })
}
