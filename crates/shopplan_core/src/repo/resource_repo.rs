//! Resource repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over canonical `resources` storage.
//! - Keep the name-uniqueness contract visible as a typed error.
//!
//! # Invariants
//! - Resource names are unique among stored resources, making lookup by
//!   name well-defined.
//! - Unset measurements persist as SQL NULL, never as zero.
//! - Deleting a resource removes its assignments (foreign-key cascade).

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::resource::{Resource, ResourceCategory, ResourceId, ResourceValidationError};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const RESOURCE_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    category,
    warehouse,
    pitch,
    center_to_center,
    diameter,
    max_value,
    model,
    notes
FROM resources";

pub type ResourceRepoResult<T> = Result<T, ResourceRepoError>;

/// Errors from resource persistence and query operations.
#[derive(Debug)]
pub enum ResourceRepoError {
    Validation(ResourceValidationError),
    Db(DbError),
    /// Target resource does not exist.
    NotFound(ResourceId),
    /// Another stored resource already carries this name.
    NameTaken(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for ResourceRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "resource not found: {id}"),
            Self::NameTaken(name) => {
                write!(f, "resource name `{name}` is already in use")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "resource repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted resource data: {message}")
            }
        }
    }
}

impl Error for ResourceRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceValidationError> for ResourceRepoError {
    fn from(value: ResourceValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for ResourceRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for ResourceRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for resource CRUD operations.
pub trait ResourceRepository {
    /// Persists one new resource with the next dense `seq` key.
    fn create_resource(&self, resource: &Resource) -> ResourceRepoResult<ResourceId>;
    /// Replaces every mutable field of one stored resource.
    fn update_resource(&self, resource: &Resource) -> ResourceRepoResult<()>;
    /// Loads one resource by ID.
    fn get_resource(&self, id: ResourceId) -> ResourceRepoResult<Option<Resource>>;
    /// Finds one resource by its unique name.
    fn find_resource_by_name(&self, name: &str) -> ResourceRepoResult<Option<Resource>>;
    /// Lists all resources in insertion order.
    fn list_resources(&self) -> ResourceRepoResult<Vec<Resource>>;
    /// Deletes one resource by ID. Returns `false` when the ID is unknown.
    fn delete_resource(&self, id: ResourceId) -> ResourceRepoResult<bool>;
}

/// SQLite-backed resource repository.
pub struct SqliteResourceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteResourceRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> ResourceRepoResult<Self> {
        let expected_version = latest_version();
        let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version != expected_version {
            return Err(ResourceRepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl ResourceRepository for SqliteResourceRepository<'_> {
    fn create_resource(&self, resource: &Resource) -> ResourceRepoResult<ResourceId> {
        resource.validate()?;

        let seq: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(seq), -1) + 1 FROM resources;",
            [],
            |row| row.get(0),
        )?;
        self.conn
            .execute(
                "INSERT INTO resources (
                    uuid,
                    seq,
                    name,
                    category,
                    warehouse,
                    pitch,
                    center_to_center,
                    diameter,
                    max_value,
                    model,
                    notes
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
                params![
                    resource.uuid.to_string(),
                    seq,
                    resource.name.as_str(),
                    category_to_db(resource.category),
                    resource.warehouse.as_str(),
                    resource.pitch,
                    resource.center_to_center,
                    resource.diameter,
                    resource.max_value,
                    resource.model.as_deref(),
                    resource.notes.as_deref(),
                ],
            )
            .map_err(|err| map_name_conflict(err, &resource.name))?;

        Ok(resource.uuid)
    }

    fn update_resource(&self, resource: &Resource) -> ResourceRepoResult<()> {
        resource.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE resources
                 SET
                    name = ?1,
                    category = ?2,
                    warehouse = ?3,
                    pitch = ?4,
                    center_to_center = ?5,
                    diameter = ?6,
                    max_value = ?7,
                    model = ?8,
                    notes = ?9,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?10;",
                params![
                    resource.name.as_str(),
                    category_to_db(resource.category),
                    resource.warehouse.as_str(),
                    resource.pitch,
                    resource.center_to_center,
                    resource.diameter,
                    resource.max_value,
                    resource.model.as_deref(),
                    resource.notes.as_deref(),
                    resource.uuid.to_string(),
                ],
            )
            .map_err(|err| map_name_conflict(err, &resource.name))?;

        if changed == 0 {
            return Err(ResourceRepoError::NotFound(resource.uuid));
        }
        Ok(())
    }

    fn get_resource(&self, id: ResourceId) -> ResourceRepoResult<Option<Resource>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RESOURCE_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_resource_row(row)?));
        }
        Ok(None)
    }

    fn find_resource_by_name(&self, name: &str) -> ResourceRepoResult<Option<Resource>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RESOURCE_SELECT_SQL} WHERE name = ?1;"))?;
        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_resource_row(row)?));
        }
        Ok(None)
    }

    fn list_resources(&self) -> ResourceRepoResult<Vec<Resource>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RESOURCE_SELECT_SQL} ORDER BY seq ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut resources = Vec::new();
        while let Some(row) = rows.next()? {
            resources.push(parse_resource_row(row)?);
        }
        Ok(resources)
    }

    fn delete_resource(&self, id: ResourceId) -> ResourceRepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM resources WHERE uuid = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }
}

fn parse_resource_row(row: &Row<'_>) -> ResourceRepoResult<Resource> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        ResourceRepoError::InvalidData(format!(
            "invalid uuid value `{uuid_text}` in resources.uuid"
        ))
    })?;

    let category_text: String = row.get("category")?;
    let category = parse_category_db(&category_text).ok_or_else(|| {
        ResourceRepoError::InvalidData(format!(
            "invalid category `{category_text}` in resources.category"
        ))
    })?;

    let resource = Resource {
        uuid,
        name: row.get("name")?,
        category,
        warehouse: row.get("warehouse")?,
        pitch: row.get("pitch")?,
        center_to_center: row.get("center_to_center")?,
        diameter: row.get("diameter")?,
        max_value: row.get("max_value")?,
        model: row.get("model")?,
        notes: row.get("notes")?,
    };
    resource.validate()?;
    Ok(resource)
}

fn category_to_db(category: ResourceCategory) -> &'static str {
    match category {
        ResourceCategory::ProbeTip => "probe_tip",
        ResourceCategory::Spindle => "spindle",
        ResourceCategory::Mask => "mask",
        ResourceCategory::Head => "head",
        ResourceCategory::Generator => "generator",
    }
}

fn parse_category_db(value: &str) -> Option<ResourceCategory> {
    match value {
        "probe_tip" => Some(ResourceCategory::ProbeTip),
        "spindle" => Some(ResourceCategory::Spindle),
        "mask" => Some(ResourceCategory::Mask),
        "head" => Some(ResourceCategory::Head),
        "generator" => Some(ResourceCategory::Generator),
        _ => None,
    }
}

fn map_name_conflict(err: rusqlite::Error, name: &str) -> ResourceRepoError {
    if let rusqlite::Error::SqliteFailure(failure, Some(message)) = &err {
        if failure.code == rusqlite::ErrorCode::ConstraintViolation
            && message.contains("resources.name")
        {
            return ResourceRepoError::NameTaken(name.to_string());
        }
    }
    ResourceRepoError::Db(DbError::Sqlite(err))
}
