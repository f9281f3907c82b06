//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the automation-adapter layer decoupled from storage details.

pub mod resource_service;
pub mod task_service;
