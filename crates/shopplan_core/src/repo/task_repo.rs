//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and outline-step APIs over canonical `tasks` storage.
//! - Provide assignment insertion and per-task assignment reads.
//!
//! # Invariants
//! - Tasks are created at depth 1 with the next dense `seq` key.
//! - `indent_step` never raises a task more than one level below its
//!   predecessor; `outdent_step` never detaches a task from its children.
//! - Deleting a task removes its assignments (foreign-key cascade).

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::resource::ResourceId;
use crate::model::task::{Task, TaskId, TaskValidationError};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    depth,
    start_ms,
    finish_ms,
    warehouse,
    manager
FROM tasks";

pub type TaskRepoResult<T> = Result<T, TaskRepoError>;

/// Errors from task persistence and outline-step operations.
#[derive(Debug)]
pub enum TaskRepoError {
    Validation(TaskValidationError),
    Db(DbError),
    /// Target task does not exist.
    NotFound(TaskId),
    /// Assignment target resource does not exist.
    ResourceNotFound(ResourceId),
    /// Create was handed a task that is not at the top level.
    NewTaskDepth { task: TaskId, depth: u32 },
    /// Indent would leave the task more than one level below its
    /// predecessor, or the task has no predecessor.
    IndentTooDeep(TaskId),
    /// Outdent attempted on a top-level task.
    OutdentAtTopLevel(TaskId),
    /// Outdent would detach the task from its deeper successors.
    OutdentSplitsChildren(TaskId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for TaskRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::ResourceNotFound(id) => write!(f, "resource not found: {id}"),
            Self::NewTaskDepth { task, depth } => write!(
                f,
                "new task {task} must start at the top level, got depth {depth}"
            ),
            Self::IndentTooDeep(id) => {
                write!(f, "indent would break outline density for task {id}")
            }
            Self::OutdentAtTopLevel(id) => {
                write!(f, "task {id} is already at the top level")
            }
            Self::OutdentSplitsChildren(id) => {
                write!(f, "outdent would detach children of task {id}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "task repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for TaskRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for TaskRepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for TaskRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for TaskRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for task storage and outline steps.
pub trait TaskRepository {
    /// Persists one new top-level task at the end of the outline.
    fn create_task(&self, task: &Task) -> TaskRepoResult<TaskId>;
    /// Loads one task by ID.
    fn get_task(&self, id: TaskId) -> TaskRepoResult<Option<Task>>;
    /// Finds the earliest-appended task with the given name.
    fn find_task_by_name(&self, name: &str) -> TaskRepoResult<Option<Task>>;
    /// Lists all tasks in outline (insertion) order.
    fn list_tasks(&self) -> TaskRepoResult<Vec<Task>>;
    /// Descends one outline level. Atomic; validates before mutating.
    fn indent_step(&self, id: TaskId) -> TaskRepoResult<()>;
    /// Ascends one outline level. Atomic; validates before mutating.
    fn outdent_step(&self, id: TaskId) -> TaskRepoResult<()>;
    /// Records one task/resource assignment. Idempotent for duplicates.
    fn add_assignment(&self, task: TaskId, resource: ResourceId) -> TaskRepoResult<()>;
    /// Names of all resources assigned to one task, in assignment order.
    fn assigned_resource_names(&self, task: TaskId) -> TaskRepoResult<Vec<String>>;
    /// Deletes one task by ID. Returns `false` when the ID is unknown.
    fn delete_task(&self, id: TaskId) -> TaskRepoResult<bool>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> TaskRepoResult<Self> {
        let expected_version = latest_version();
        let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version != expected_version {
            return Err(TaskRepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }

    fn seq_and_depth(&self, id: TaskId) -> TaskRepoResult<(i64, u32)> {
        let row = self
            .conn
            .query_row(
                "SELECT seq, depth FROM tasks WHERE uuid = ?1;",
                [id.to_string()],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;
        let (seq, depth) = row.ok_or(TaskRepoError::NotFound(id))?;
        Ok((seq, parse_depth(depth)?))
    }

    fn set_depth(&self, id: TaskId, depth: u32) -> TaskRepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET depth = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), i64::from(depth)],
        )?;
        if changed == 0 {
            return Err(TaskRepoError::NotFound(id));
        }
        Ok(())
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> TaskRepoResult<TaskId> {
        task.validate()?;
        if task.depth != 1 {
            return Err(TaskRepoError::NewTaskDepth {
                task: task.uuid,
                depth: task.depth,
            });
        }

        let seq: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(seq), -1) + 1 FROM tasks;",
            [],
            |row| row.get(0),
        )?;
        self.conn.execute(
            "INSERT INTO tasks (
                uuid,
                seq,
                name,
                depth,
                start_ms,
                finish_ms,
                warehouse,
                manager
            ) VALUES (?1, ?2, ?3, 1, ?4, ?5, ?6, ?7);",
            params![
                task.uuid.to_string(),
                seq,
                task.name.as_str(),
                task.start_ms,
                task.finish_ms,
                task.warehouse.as_str(),
                task.manager.as_str(),
            ],
        )?;

        Ok(task.uuid)
    }

    fn get_task(&self, id: TaskId) -> TaskRepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn find_task_by_name(&self, name: &str) -> TaskRepoResult<Option<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL} WHERE name = ?1 ORDER BY seq ASC LIMIT 1;"
        ))?;
        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn list_tasks(&self) -> TaskRepoResult<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} ORDER BY seq ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn indent_step(&self, id: TaskId) -> TaskRepoResult<()> {
        let (seq, depth) = self.seq_and_depth(id)?;
        let predecessor_depth: Option<i64> = self
            .conn
            .query_row(
                "SELECT depth FROM tasks WHERE seq < ?1 ORDER BY seq DESC LIMIT 1;",
                [seq],
                |row| row.get(0),
            )
            .optional()?;
        match predecessor_depth {
            None => Err(TaskRepoError::IndentTooDeep(id)),
            Some(raw) => {
                let pred = parse_depth(raw)?;
                if depth > pred {
                    return Err(TaskRepoError::IndentTooDeep(id));
                }
                self.set_depth(id, depth + 1)
            }
        }
    }

    fn outdent_step(&self, id: TaskId) -> TaskRepoResult<()> {
        let (seq, depth) = self.seq_and_depth(id)?;
        if depth <= 1 {
            return Err(TaskRepoError::OutdentAtTopLevel(id));
        }
        let successor_depth: Option<i64> = self
            .conn
            .query_row(
                "SELECT depth FROM tasks WHERE seq > ?1 ORDER BY seq ASC LIMIT 1;",
                [seq],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(raw) = successor_depth {
            if parse_depth(raw)? > depth {
                return Err(TaskRepoError::OutdentSplitsChildren(id));
            }
        }
        self.set_depth(id, depth - 1)
    }

    fn add_assignment(&self, task: TaskId, resource: ResourceId) -> TaskRepoResult<()> {
        let task_exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM tasks WHERE uuid = ?1);",
            [task.to_string()],
            |row| row.get(0),
        )?;
        if task_exists == 0 {
            return Err(TaskRepoError::NotFound(task));
        }
        let resource_exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM resources WHERE uuid = ?1);",
            [resource.to_string()],
            |row| row.get(0),
        )?;
        if resource_exists == 0 {
            return Err(TaskRepoError::ResourceNotFound(resource));
        }

        self.conn.execute(
            "INSERT OR IGNORE INTO assignments (task_uuid, resource_uuid)
             VALUES (?1, ?2);",
            params![task.to_string(), resource.to_string()],
        )?;
        Ok(())
    }

    fn assigned_resource_names(&self, task: TaskId) -> TaskRepoResult<Vec<String>> {
        let task_exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM tasks WHERE uuid = ?1);",
            [task.to_string()],
            |row| row.get(0),
        )?;
        if task_exists == 0 {
            return Err(TaskRepoError::NotFound(task));
        }

        let mut stmt = self.conn.prepare(
            "SELECT r.name
             FROM assignments a
             JOIN resources r ON r.uuid = a.resource_uuid
             WHERE a.task_uuid = ?1
             ORDER BY a.rowid ASC;",
        )?;
        let mut rows = stmt.query([task.to_string()])?;
        let mut names = Vec::new();
        while let Some(row) = rows.next()? {
            names.push(row.get(0)?);
        }
        Ok(names)
    }

    fn delete_task(&self, id: TaskId) -> TaskRepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE uuid = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }
}

fn parse_task_row(row: &Row<'_>) -> TaskRepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        TaskRepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in tasks.uuid"))
    })?;

    let task = Task {
        uuid,
        name: row.get("name")?,
        depth: parse_depth(row.get("depth")?)?,
        start_ms: row.get("start_ms")?,
        finish_ms: row.get("finish_ms")?,
        warehouse: row.get("warehouse")?,
        manager: row.get("manager")?,
    };
    task.validate()?;
    Ok(task)
}

fn parse_depth(value: i64) -> TaskRepoResult<u32> {
    u32::try_from(value)
        .ok()
        .filter(|depth| *depth >= 1)
        .ok_or_else(|| TaskRepoError::InvalidData(format!("invalid depth value `{value}` in tasks.depth")))
}
