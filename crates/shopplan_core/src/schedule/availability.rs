//! Assignment-overlap availability check.
//!
//! # Responsibility
//! - Test a proposed time window against a resource's existing task
//!   assignments.
//!
//! # Invariants
//! - A window conflicts with an assignment iff
//!   `window_start < task_finish && window_end > task_start`.
//! - The walk stops at the first conflicting assignment.
//! - All instants are epoch milliseconds in one consistent reference;
//!   the adapter strips timezone annotations before they reach core.

use crate::db::DbError;
use crate::model::resource::ResourceId;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for availability checks.
pub type AvailabilityResult<T> = Result<T, AvailabilityError>;

/// Errors from availability checks.
#[derive(Debug)]
pub enum AvailabilityError {
    /// Target resource does not exist.
    ResourceNotFound(ResourceId),
    /// Window finishes before it starts.
    InvalidWindow { start_ms: i64, end_ms: i64 },
    Db(DbError),
}

impl Display for AvailabilityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ResourceNotFound(id) => write!(f, "resource not found: {id}"),
            Self::InvalidWindow { start_ms, end_ms } => write!(
                f,
                "availability window end {end_ms} precedes start {start_ms}"
            ),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AvailabilityError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for AvailabilityError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for AvailabilityError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Half-open interval overlap test.
///
/// Touching endpoints do not overlap: `[10:00, 11:00)` against
/// `[11:00, 12:00)` is free.
pub fn overlaps(
    window_start_ms: i64,
    window_end_ms: i64,
    task_start_ms: i64,
    task_finish_ms: i64,
) -> bool {
    window_start_ms < task_finish_ms && window_end_ms > task_start_ms
}

/// Tests whether a resource is free of conflicting assignments inside the
/// proposed window.
///
/// Returns `Ok(false)` on the first conflicting assignment, `Ok(true)` when
/// none conflict or the resource has no assignments at all.
///
/// # Errors
/// - [`AvailabilityError::ResourceNotFound`] for an unknown resource ID.
/// - [`AvailabilityError::InvalidWindow`] when `window_start_ms` exceeds
///   `window_end_ms`.
pub fn is_available(
    conn: &Connection,
    resource_id: ResourceId,
    window_start_ms: i64,
    window_end_ms: i64,
) -> AvailabilityResult<bool> {
    if window_start_ms > window_end_ms {
        return Err(AvailabilityError::InvalidWindow {
            start_ms: window_start_ms,
            end_ms: window_end_ms,
        });
    }

    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM resources WHERE uuid = ?1);",
        [resource_id.to_string()],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Err(AvailabilityError::ResourceNotFound(resource_id));
    }

    let mut stmt = conn.prepare(
        "SELECT t.start_ms, t.finish_ms
         FROM assignments a
         JOIN tasks t ON t.uuid = a.task_uuid
         WHERE a.resource_uuid = ?1
         ORDER BY t.seq ASC;",
    )?;
    let mut rows = stmt.query([resource_id.to_string()])?;
    while let Some(row) = rows.next()? {
        let task_start_ms: i64 = row.get(0)?;
        let task_finish_ms: i64 = row.get(1)?;
        if overlaps(window_start_ms, window_end_ms, task_start_ms, task_finish_ms) {
            return Ok(false);
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::overlaps;

    #[test]
    fn window_inside_assignment_overlaps() {
        assert!(overlaps(30, 45, 0, 60));
    }

    #[test]
    fn window_straddling_either_edge_overlaps() {
        assert!(overlaps(-10, 10, 0, 60));
        assert!(overlaps(50, 70, 0, 60));
    }

    #[test]
    fn touching_endpoints_do_not_overlap() {
        assert!(!overlaps(60, 120, 0, 60));
        assert!(!overlaps(-60, 0, 0, 60));
    }

    #[test]
    fn disjoint_windows_do_not_overlap() {
        assert!(!overlaps(100, 200, 0, 60));
    }

    #[test]
    fn zero_length_window_conflicts_only_strictly_inside() {
        assert!(overlaps(30, 30, 0, 60));
        assert!(!overlaps(0, 0, 0, 60));
        assert!(!overlaps(60, 60, 0, 60));
    }
}
