//! Task use-case service and outline placement.
//!
//! # Responsibility
//! - Append tasks with fail-fast parent resolution and outline placement.
//! - Derive outline positions and assemble task view records.
//! - Record resource assignments for tasks.
//!
//! # Invariants
//! - Placement applies a bounded run of same-direction outline steps; a
//!   newly appended task starts at depth 1, so no mixed runs occur.
//! - An unknown parent fails before any task row is written.
//! - Outline positions among siblings are dense; derivation walks the
//!   stored order.

use crate::model::resource::ResourceId;
use crate::model::task::{Task, TaskId, TaskValidationError};
use crate::model::view::TaskView;
use crate::repo::task_repo::{TaskRepoError, TaskRepository};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Request model for appending one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendTaskRequest {
    pub name: String,
    /// Scheduled start, epoch milliseconds.
    pub start_ms: i64,
    /// Scheduled finish, epoch milliseconds.
    pub finish_ms: i64,
    pub warehouse: String,
    pub manager: String,
    /// Outline anchor; the appended task is stepped down to this task's
    /// depth. `None` keeps the task at the top level.
    pub parent: Option<TaskId>,
}

/// Errors from task use-case operations.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Target task does not exist.
    TaskNotFound(TaskId),
    /// Designated parent does not exist; nothing was mutated.
    ParentNotFound(TaskId),
    /// Request model failed validation.
    Validation(TaskValidationError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
    /// Persistence-layer failure.
    Repo(TaskRepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::ParentNotFound(id) => write!(f, "parent task not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent task state: {details}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskRepoError> for TaskServiceError {
    fn from(value: TaskRepoError) -> Self {
        match value {
            TaskRepoError::NotFound(id) => Self::TaskNotFound(id),
            TaskRepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Task service facade.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Appends one task at the end of the outline and places it.
    ///
    /// # Contract
    /// - The window is validated and the parent resolved before any row is
    ///   written; an unknown parent leaves the store untouched.
    /// - The created task starts at depth 1 and is then stepped to the
    ///   parent's depth.
    /// - Returns the task as stored after placement.
    pub fn append_task(&self, request: &AppendTaskRequest) -> Result<Task, TaskServiceError> {
        let task = Task::new(
            request.name.clone(),
            request.start_ms,
            request.finish_ms,
            request.warehouse.clone(),
            request.manager.clone(),
        );
        task.validate().map_err(TaskServiceError::Validation)?;

        if let Some(parent_id) = request.parent {
            if self.repo.get_task(parent_id)?.is_none() {
                return Err(TaskServiceError::ParentNotFound(parent_id));
            }
        }

        self.repo.create_task(&task)?;
        self.place(task.uuid, request.parent)?;

        self.repo
            .get_task(task.uuid)?
            .ok_or(TaskServiceError::InconsistentState(
                "created task row missing after placement",
            ))
    }

    /// Places one task relative to an optional parent.
    ///
    /// With a parent: applies `indent_step` exactly `parent.depth -
    /// task.depth` times, so the task ends at the parent's depth. Without:
    /// applies `outdent_step` until the task is back at the top level.
    /// The parent is resolved before the first step; no partial runs on an
    /// unknown parent.
    pub fn place(&self, task_id: TaskId, parent: Option<TaskId>) -> Result<(), TaskServiceError> {
        let task = self
            .repo
            .get_task(task_id)?
            .ok_or(TaskServiceError::TaskNotFound(task_id))?;

        match parent {
            Some(parent_id) => {
                let parent = self
                    .repo
                    .get_task(parent_id)?
                    .ok_or(TaskServiceError::ParentNotFound(parent_id))?;
                for _ in task.depth..parent.depth {
                    self.repo.indent_step(task_id)?;
                }
            }
            None => {
                for _ in 1..task.depth {
                    self.repo.outdent_step(task_id)?;
                }
            }
        }
        Ok(())
    }

    /// Records assignments of the given resources to one task.
    pub fn assign_resources(
        &self,
        task_id: TaskId,
        resource_ids: &[ResourceId],
    ) -> Result<(), TaskServiceError> {
        for resource_id in resource_ids {
            self.repo.add_assignment(task_id, *resource_id)?;
        }
        Ok(())
    }

    /// Loads one task by ID.
    pub fn get_task(&self, id: TaskId) -> Result<Option<Task>, TaskServiceError> {
        Ok(self.repo.get_task(id)?)
    }

    /// Finds the earliest-appended task with the given name.
    pub fn find_task_by_name(&self, name: &str) -> Result<Option<Task>, TaskServiceError> {
        Ok(self.repo.find_task_by_name(name)?)
    }

    /// Projects every task into its caller-facing view, outline positions
    /// and assigned resource names included.
    pub fn list_task_views(&self) -> Result<Vec<TaskView>, TaskServiceError> {
        let tasks = self.repo.list_tasks()?;
        let paths = outline_paths(&tasks);

        let mut views = Vec::with_capacity(tasks.len());
        for (task, path) in tasks.iter().zip(paths.iter()) {
            let resources = self.repo.assigned_resource_names(task.uuid)?;
            views.push(TaskView::project(task, path, resources));
        }
        Ok(views)
    }

    /// Deletes one task by ID. Returns `false` when the ID is unknown.
    pub fn delete_task(&self, id: TaskId) -> Result<bool, TaskServiceError> {
        let deleted = self.repo.delete_task(id)?;
        if deleted {
            info!("event=task_delete module=service status=ok task={id}");
        }
        Ok(deleted)
    }
}

/// Derives the outline position of every task from the stored order and
/// depths.
///
/// The walk keeps one counter per level: entering a deeper level opens a
/// new counter at 1, returning to a shallower level discards the deeper
/// counters and increments the sibling counter. Density of sibling
/// positions falls out of the derivation.
pub fn outline_paths(tasks: &[Task]) -> Vec<Vec<u32>> {
    let mut counters: Vec<u32> = Vec::new();
    let mut paths = Vec::with_capacity(tasks.len());

    for task in tasks {
        // Step rules keep depth <= predecessor depth + 1; the clamp only
        // matters for corrupt stores.
        let depth = (task.depth as usize).min(counters.len() + 1);
        debug_assert_eq!(depth, task.depth as usize);

        counters.truncate(depth);
        if counters.len() < depth {
            counters.push(0);
        }
        counters[depth - 1] += 1;
        paths.push(counters.clone());
    }

    paths
}
