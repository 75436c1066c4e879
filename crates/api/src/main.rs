use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use warden_api::app::{self, SharedStore};
use warden_api::cli::Cli;
use warden_auth::Argon2PasswordEncoder;
use warden_infra::{InMemoryCredentialStore, PostgresCredentialStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.log_pretty {
        warden_observability::init_pretty();
    } else {
        warden_observability::init();
    }

    let config = cli.security_config();

    let store = build_store(&cli).await?;
    let app = app::build_app(&config, store).context("invalid security configuration")?;

    let listener = tokio::net::TcpListener::bind(&cli.bind)
        .await
        .with_context(|| format!("failed to bind {}", cli.bind))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_store(cli: &Cli) -> anyhow::Result<SharedStore> {
    if let Some(url) = cli.database_url.as_deref() {
        let store = PostgresCredentialStore::connect(url).await?;
        store.ensure_schema().await?;
        tracing::info!("using postgres credential store");
        return Ok(Arc::new(store));
    }

    let store = InMemoryCredentialStore::new();
    match (cli.admin_username.as_deref(), cli.admin_password.as_deref()) {
        (Some(username), Some(password)) => {
            let encoder = Argon2PasswordEncoder::new();
            store.register(&encoder, username, password, None, None, &["ADMIN", "USER"])?;
            tracing::info!(username, "bootstrap admin registered");
        }
        (Some(_), None) | (None, Some(_)) => {
            tracing::warn!("bootstrap admin needs both username and password; skipping");
        }
        (None, None) => {
            tracing::warn!("using in-memory credential store with no users");
        }
    }
    Ok(Arc::new(store))
}
