//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical scheduled-task record.
//! - Validate the time window and outline depth before persistence.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another task.
//! - `start_ms <= finish_ms`.
//! - `depth >= 1`; a task's outline position is derived from the stored
//!   order and depth, never stored itself.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a task.
pub type TaskId = Uuid;

/// Canonical scheduled-task record.
///
/// Both instants are epoch milliseconds in one consistent time reference;
/// the automation adapter strips timezone annotations before they reach
/// this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable global ID used for lookups and assignment references.
    pub uuid: TaskId,
    /// Display name; not required to be unique.
    pub name: String,
    /// Outline depth, 1 = top level.
    pub depth: u32,
    /// Scheduled start, epoch milliseconds.
    pub start_ms: i64,
    /// Scheduled finish, epoch milliseconds. Never before `start_ms`.
    pub finish_ms: i64,
    /// Warehouse tag, free-form.
    pub warehouse: String,
    /// Manager tag, free-form.
    pub manager: String,
}

/// Validation failures for task write models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// `finish_ms` precedes `start_ms`.
    FinishBeforeStart { start_ms: i64, finish_ms: i64 },
    /// Depth fell below the top level.
    DepthOutOfRange(u32),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FinishBeforeStart {
                start_ms,
                finish_ms,
            } => write!(
                f,
                "task finish {finish_ms} precedes start {start_ms}"
            ),
            Self::DepthOutOfRange(depth) => {
                write!(f, "task depth {depth} is below the top level")
            }
        }
    }
}

impl Error for TaskValidationError {}

impl Task {
    /// Creates a new top-level task with a generated stable ID.
    pub fn new(
        name: impl Into<String>,
        start_ms: i64,
        finish_ms: i64,
        warehouse: impl Into<String>,
        manager: impl Into<String>,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), name, start_ms, finish_ms, warehouse, manager)
    }

    /// Creates a new top-level task with a caller-provided stable ID.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(
        uuid: TaskId,
        name: impl Into<String>,
        start_ms: i64,
        finish_ms: i64,
        warehouse: impl Into<String>,
        manager: impl Into<String>,
    ) -> Self {
        Self {
            uuid,
            name: name.into(),
            depth: 1,
            start_ms,
            finish_ms,
            warehouse: warehouse.into(),
            manager: manager.into(),
        }
    }

    /// Checks the model invariants.
    ///
    /// # Errors
    /// - [`TaskValidationError::FinishBeforeStart`] when the window is
    ///   inverted.
    /// - [`TaskValidationError::DepthOutOfRange`] when depth is zero.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.finish_ms < self.start_ms {
            return Err(TaskValidationError::FinishBeforeStart {
                start_ms: self.start_ms,
                finish_ms: self.finish_ms,
            });
        }
        if self.depth < 1 {
            return Err(TaskValidationError::DepthOutOfRange(self.depth));
        }
        Ok(())
    }
}
