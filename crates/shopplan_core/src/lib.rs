//! Core domain logic for shop-floor task and resource planning.
//! This crate is the single source of truth for business invariants:
//! outline hierarchy density, assignment-overlap availability, and the
//! closed resource category set.

pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod schedule;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::resource::{Resource, ResourceCategory, ResourceId, ResourceValidationError};
pub use model::task::{Task, TaskId, TaskValidationError};
pub use model::view::{ResourceView, TaskView};
pub use query::engine::{query_resources, QueryError, QueryResult, ResourceQuery};
pub use repo::resource_repo::{
    ResourceRepoError, ResourceRepoResult, ResourceRepository, SqliteResourceRepository,
};
pub use repo::task_repo::{SqliteTaskRepository, TaskRepoError, TaskRepoResult, TaskRepository};
pub use schedule::availability::{is_available, AvailabilityError, AvailabilityResult};
pub use service::resource_service::{
    AppendResourceRequest, ResourceService, ResourceServiceError,
};
pub use service::task_service::{
    outline_paths, AppendTaskRequest, TaskService, TaskServiceError,
};

/// Minimal health-check API for early adapter integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
