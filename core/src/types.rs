//! Shared primitive types used across the entire engine.

/// Surrogate key of a dimension row (customer or product).
pub type EntityKey = i64;

/// Business order identifier. One order spans one or more fact lines.
pub type OrderNumber = String;

/// The canonical run identifier.
pub type RunId = String;
