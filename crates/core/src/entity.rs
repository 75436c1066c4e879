//! Entity trait: records that keep their identity across state changes.

/// Entity marker + minimal interface.
///
/// Credential records are entities: a role edit does not make them a different user.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
