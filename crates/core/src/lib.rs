//! `warden-core`: shared identity primitives (no infrastructure concerns).
//!
//! Everything here is pure: identifiers, value objects and the domain error model
//! used by the auth and infra crates.

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::UserId;
pub use value_object::{Username, ValueObject, MAX_USERNAME_LEN};
