//! Postgres-backed credential store.
//!
//! Reads the `"user"`, `role` and `user_role` tables:
//!
//! | table | columns |
//! |-------|---------|
//! | `"user"` | `id`, `username` (unique, ≤64), `first_name`, `last_name`, `password` (≤128), `enabled` |
//! | `role` | `id`, `name` |
//! | `user_role` | `user_id`, `role_id` |
//!
//! ## Error Mapping
//!
//! Every SQLx error becomes `CredentialStoreError::Unavailable`; a row that
//! violates the record invariants (blank id, over-long username) becomes
//! `CredentialStoreError::Corrupt`. Neither is ever reported as "not found".

use std::collections::BTreeSet;

use sqlx::{PgPool, Row};
use tracing::instrument;

use warden_auth::{CredentialRecord, CredentialStore, CredentialStoreError, Role};
use warden_core::{UserId, Username};

/// Schema for the tables this store reads.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS "user" (
    id          TEXT PRIMARY KEY,
    username    VARCHAR(64)  NOT NULL UNIQUE,
    first_name  VARCHAR(64),
    last_name   VARCHAR(64),
    password    VARCHAR(128) NOT NULL,
    enabled     BOOLEAN DEFAULT TRUE
);

CREATE TABLE IF NOT EXISTS role (
    id    TEXT PRIMARY KEY,
    name  VARCHAR(64) NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS user_role (
    user_id  TEXT NOT NULL REFERENCES "user"(id) ON DELETE CASCADE,
    role_id  TEXT NOT NULL REFERENCES role(id) ON DELETE CASCADE,
    PRIMARY KEY (user_id, role_id)
);
"#;

/// Postgres-backed [`CredentialStore`].
///
/// `PgPool` is internally reference-counted; clone the store freely.
#[derive(Debug, Clone)]
pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Create the credential tables if they do not exist.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl CredentialStore for PostgresCredentialStore {
    #[instrument(skip(self), fields(operation = "find_by_username"))]
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, CredentialStoreError> {
        let row = sqlx::query(
            r#"
            SELECT
                u.id::text AS id,
                u.username,
                u.first_name,
                u.last_name,
                u.password,
                u.enabled,
                COALESCE(
                    array_agg(r.name) FILTER (WHERE r.name IS NOT NULL),
                    ARRAY[]::text[]
                ) AS roles
            FROM "user" u
            LEFT JOIN user_role ur ON ur.user_id = u.id
            LEFT JOIN role r ON r.id = ur.role_id
            WHERE u.username = $1
            GROUP BY u.id, u.username, u.first_name, u.last_name, u.password, u.enabled
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_username", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id: String = row.try_get("id").map_err(|e| map_sqlx_error("read id", e))?;
        let username: String = row
            .try_get("username")
            .map_err(|e| map_sqlx_error("read username", e))?;
        let roles: Vec<String> = row
            .try_get("roles")
            .map_err(|e| map_sqlx_error("read roles", e))?;
        let enabled: Option<bool> = row
            .try_get("enabled")
            .map_err(|e| map_sqlx_error("read enabled", e))?;

        Ok(Some(CredentialRecord {
            id: UserId::new(id).map_err(|e| CredentialStoreError::Corrupt(e.to_string()))?,
            username: Username::new(username)
                .map_err(|e| CredentialStoreError::Corrupt(e.to_string()))?,
            first_name: row
                .try_get("first_name")
                .map_err(|e| map_sqlx_error("read first_name", e))?,
            last_name: row
                .try_get("last_name")
                .map_err(|e| map_sqlx_error("read last_name", e))?,
            password_hash: row
                .try_get("password")
                .map_err(|e| map_sqlx_error("read password", e))?,
            // Column defaults to TRUE; a NULL means the flag was never set.
            enabled: enabled.unwrap_or(true),
            roles: roles.into_iter().map(Role::new).collect::<BTreeSet<_>>(),
        }))
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> CredentialStoreError {
    tracing::error!(operation, error = %err, "credential store query failed");
    CredentialStoreError::Unavailable(format!("{operation}: {err}"))
}
