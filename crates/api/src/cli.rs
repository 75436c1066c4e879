//! Command-line / environment configuration for the `warden-api` binary.

use clap::Parser;

use warden_auth::{DEFAULT_EXPIRATION_MILLIS, TokenSettings};

use crate::config::{DEFAULT_STORE_TIMEOUT_MS, SecurityConfig};

pub const ENV_BIND: &str = "WARDEN_BIND";
pub const ENV_JWT_SECRET: &str = "WARDEN_JWT_SECRET";
pub const ENV_TOKEN_EXPIRATION_MS: &str = "WARDEN_TOKEN_EXPIRATION_MS";
pub const ENV_UNSECURED_ENDPOINTS: &str = "WARDEN_UNSECURED_ENDPOINTS";
pub const ENV_PERMIT_PREFLIGHT: &str = "WARDEN_PERMIT_PREFLIGHT";
pub const ENV_STORE_TIMEOUT_MS: &str = "WARDEN_STORE_TIMEOUT_MS";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_ADMIN_USERNAME: &str = "WARDEN_ADMIN_USERNAME";
pub const ENV_ADMIN_PASSWORD: &str = "WARDEN_ADMIN_PASSWORD";
pub const ENV_LOG_PRETTY: &str = "WARDEN_LOG_PRETTY";

const INSECURE_DEV_SECRET: &str = "dev-secret";

#[derive(Debug, Parser)]
#[command(name = "warden-api")]
#[command(version, about = "Stateless token authentication gateway", long_about = None)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = ENV_BIND, default_value = "0.0.0.0:8080")]
    pub bind: String,

    /// HMAC secret used to sign session tokens
    #[arg(long, env = ENV_JWT_SECRET, hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Token lifetime in milliseconds
    #[arg(long, env = ENV_TOKEN_EXPIRATION_MS, default_value_t = DEFAULT_EXPIRATION_MILLIS)]
    pub token_expiration_ms: i64,

    /// Comma-separated `[METHOD ]<pattern>` entries reachable without a token
    #[arg(long, env = ENV_UNSECURED_ENDPOINTS, value_delimiter = ',', default_value = "GET /health")]
    pub unsecured_endpoints: Vec<String>,

    /// Let CORS preflight (OPTIONS) requests through unauthenticated
    #[arg(long, env = ENV_PERMIT_PREFLIGHT, default_value_t = true, action = clap::ArgAction::Set)]
    pub permit_preflight: bool,

    /// Upper bound on one credential store lookup, in milliseconds
    #[arg(long, env = ENV_STORE_TIMEOUT_MS, default_value_t = DEFAULT_STORE_TIMEOUT_MS)]
    pub store_timeout_ms: u64,

    /// Postgres URL; without it an in-memory credential store is used
    #[arg(long, env = ENV_DATABASE_URL, hide_env_values = true)]
    pub database_url: Option<String>,

    /// Bootstrap admin for the in-memory store
    #[arg(long, env = ENV_ADMIN_USERNAME)]
    pub admin_username: Option<String>,

    #[arg(long, env = ENV_ADMIN_PASSWORD, hide_env_values = true)]
    pub admin_password: Option<String>,

    /// Human-readable logs instead of JSON
    #[arg(long, env = ENV_LOG_PRETTY)]
    pub log_pretty: bool,
}

impl Cli {
    pub fn security_config(&self) -> SecurityConfig {
        let secret = self.jwt_secret.clone().unwrap_or_else(|| {
            tracing::warn!("{ENV_JWT_SECRET} not set; using insecure dev default");
            INSECURE_DEV_SECRET.to_string()
        });

        SecurityConfig {
            token: TokenSettings::new(secret).with_expiration_millis(self.token_expiration_ms),
            unsecured_endpoints: self
                .unsecured_endpoints
                .iter()
                .map(|e| e.trim().to_string())
                .collect(),
            permit_preflight: self.permit_preflight,
            store_timeout_ms: self.store_timeout_ms,
        }
    }
}
