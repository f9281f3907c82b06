//! Multi-predicate resource query engine.
//!
//! # Responsibility
//! - Compose optional equality/range/availability predicates over the
//!   resource set.
//!
//! # Invariants
//! - All given predicates are ANDed; omitted predicates impose nothing.
//! - Result order is the resource insertion order, never re-sorted.
//! - Cheap attribute filters run before the availability walk.

pub mod engine;
