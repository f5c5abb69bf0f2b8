//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Access-control grants (resources, entries, whole ACLs) are value objects:
/// two grants naming the same resource and permission are the same grant.
///
/// Value objects are never mutated in place. Operations that "change" one
/// return a new value, so a reader holding the old value keeps a consistent
/// snapshot.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
