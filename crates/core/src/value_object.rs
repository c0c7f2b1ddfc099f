//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity; two values with the same attributes are the
/// same value (`OwnerRef`, `Coordinates`). Entities such as `Address` are
/// compared by id instead.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
