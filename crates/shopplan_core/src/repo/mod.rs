//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the entity-store contracts consumed by core services.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must enforce model `validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, step violations)
//!   in addition to DB transport errors.

pub mod resource_repo;
pub mod task_repo;
