//! Infrastructure layer: credential store adapters.

pub mod credential_store;

pub use credential_store::InMemoryCredentialStore;
#[cfg(feature = "postgres")]
pub use credential_store::PostgresCredentialStore;
