//! Domain model for scheduled tasks and assignable resources.
//!
//! # Responsibility
//! - Define canonical typed records used by core business logic.
//! - Define the external-facing view records produced by projection.
//!
//! # Invariants
//! - Every domain object is identified by a stable UUID.
//! - Write models are validated before persistence; unset optional
//!   measurements stay `None`, never a zero stand-in.

pub mod resource;
pub mod task;
pub mod view;
