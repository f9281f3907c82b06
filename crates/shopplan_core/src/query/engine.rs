//! Predicate compilation and execution for resource queries.
//!
//! # Responsibility
//! - Compile present attribute predicates into one SQL filter pass.
//! - Apply the availability predicate to the surviving rows.
//! - Return projected `ResourceView` records in insertion order.
//!
//! # Invariants
//! - A resource with an unset attribute never satisfies a range bound on
//!   that attribute (missing data never satisfies a bound).
//! - The availability predicate applies only when BOTH window bounds are
//!   given; a lone bound is ignored.

use crate::db::DbError;
use crate::model::resource::{ResourceCategory, ResourceId};
use crate::model::view::ResourceView;
use crate::schedule::availability::{is_available, AvailabilityError};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Result type for resource queries.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors from resource query execution.
#[derive(Debug)]
pub enum QueryError {
    /// Both window bounds given, but the window is inverted.
    InvalidWindow { start_ms: i64, end_ms: i64 },
    /// Availability walk failed for a matched resource.
    Availability(AvailabilityError),
    Db(DbError),
    /// Persisted data cannot be converted to a valid view record.
    InvalidData(String),
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidWindow { start_ms, end_ms } => write!(
                f,
                "query window end {end_ms} precedes start {start_ms}"
            ),
            Self::Availability(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid resource row: {message}"),
        }
    }
}

impl Error for QueryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Availability(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AvailabilityError> for QueryError {
    fn from(value: AvailabilityError) -> Self {
        Self::Availability(value)
    }
}

impl From<DbError> for QueryError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for QueryError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Optional predicate set for [`query_resources`].
///
/// Every field defaults to "no constraint".
#[derive(Debug, Clone, Default)]
pub struct ResourceQuery {
    /// Exact category match.
    pub category: Option<ResourceCategory>,
    /// Exact warehouse-tag match.
    pub warehouse: Option<String>,
    /// Inclusive lower diameter bound; unset diameters never match.
    pub min_diameter: Option<f64>,
    /// Inclusive upper diameter bound; unset diameters never match.
    pub max_diameter: Option<f64>,
    /// Exact pitch match.
    pub pitch: Option<f64>,
    /// Exact center-to-center match.
    pub center_to_center: Option<f64>,
    /// Exact model match.
    pub model: Option<String>,
    /// Availability window start; only effective together with
    /// `available_until`.
    pub available_from: Option<i64>,
    /// Availability window end; only effective together with
    /// `available_from`.
    pub available_until: Option<i64>,
}

/// Runs the predicate set over the resource collection.
///
/// Attribute predicates are compiled into one SQL pass; the availability
/// predicate then walks assignments for the rows that survived. Results
/// keep the resource insertion order. No match is `Ok(vec![])`, not an
/// error.
///
/// # Errors
/// - [`QueryError::InvalidWindow`] when both window bounds are given and
///   inverted.
pub fn query_resources(conn: &Connection, query: &ResourceQuery) -> QueryResult<Vec<ResourceView>> {
    let window = resolve_window(query)?;

    let mut sql = String::from(
        "SELECT
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
         FROM resources
         WHERE 1 = 1",
    );
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(category) = query.category {
        sql.push_str(" AND category = ?");
        bind_values.push(Value::Text(category_to_db(category).to_string()));
    }
    if let Some(warehouse) = &query.warehouse {
        sql.push_str(" AND warehouse = ?");
        bind_values.push(Value::Text(warehouse.clone()));
    }
    if let Some(min_diameter) = query.min_diameter {
        sql.push_str(" AND diameter >= ?");
        bind_values.push(Value::Real(min_diameter));
    }
    if let Some(max_diameter) = query.max_diameter {
        sql.push_str(" AND diameter <= ?");
        bind_values.push(Value::Real(max_diameter));
    }
    if let Some(pitch) = query.pitch {
        sql.push_str(" AND pitch = ?");
        bind_values.push(Value::Real(pitch));
    }
    if let Some(center_to_center) = query.center_to_center {
        sql.push_str(" AND center_to_center = ?");
        bind_values.push(Value::Real(center_to_center));
    }
    if let Some(model) = &query.model {
        sql.push_str(" AND model = ?");
        bind_values.push(Value::Text(model.clone()));
    }

    sql.push_str(" ORDER BY seq ASC");

    let mut matched: Vec<(ResourceId, ResourceView)> = Vec::new();
    {
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        while let Some(row) = rows.next()? {
            matched.push(parse_view_row(row)?);
        }
    }

    let mut views = Vec::with_capacity(matched.len());
    for (resource_id, view) in matched {
        if let Some((start_ms, end_ms)) = window {
            if !is_available(conn, resource_id, start_ms, end_ms)? {
                continue;
            }
        }
        views.push(view);
    }

    debug!(
        "event=resource_query module=query status=ok matches={}",
        views.len()
    );
    Ok(views)
}

fn resolve_window(query: &ResourceQuery) -> QueryResult<Option<(i64, i64)>> {
    match (query.available_from, query.available_until) {
        (Some(start_ms), Some(end_ms)) if start_ms > end_ms => {
            Err(QueryError::InvalidWindow { start_ms, end_ms })
        }
        (Some(start_ms), Some(end_ms)) => Ok(Some((start_ms, end_ms))),
        // One bound alone is not a valid filter.
        _ => Ok(None),
    }
}

fn parse_view_row(row: &Row<'_>) -> QueryResult<(ResourceId, ResourceView)> {
    let uuid_text: String = row.get("uuid")?;
    let resource_id = Uuid::parse_str(&uuid_text)
        .map_err(|_| QueryError::InvalidData(format!("invalid uuid `{uuid_text}`")))?;

    let category_text: String = row.get("category")?;
    let category = parse_category_db(&category_text)
        .ok_or_else(|| QueryError::InvalidData(format!("invalid category `{category_text}`")))?;

    let view = ResourceView {
        name: row.get("name")?,
        category,
        model: row.get("model")?,
        pitch: row.get("pitch")?,
        center_to_center: row.get("center_to_center")?,
        diameter: row.get("diameter")?,
        max_value: row.get("max_value")?,
        warehouse: row.get("warehouse")?,
        notes: row.get("notes")?,
    };
    Ok((resource_id, view))
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

#[cfg(test)]
mod tests {
    use super::{resolve_window, ResourceQuery};

    #[test]
    fn window_requires_both_bounds() {
        let mut query = ResourceQuery {
            available_from: Some(100),
            ..ResourceQuery::default()
        };
        assert_eq!(resolve_window(&query).unwrap(), None);

        query.available_from = None;
        query.available_until = Some(100);
        assert_eq!(resolve_window(&query).unwrap(), None);

        query.available_from = Some(50);
        assert_eq!(resolve_window(&query).unwrap(), Some((50, 100)));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let query = ResourceQuery {
            available_from: Some(200),
            available_until: Some(100),
            ..ResourceQuery::default()
        };
        assert!(resolve_window(&query).is_err());
    }
}
