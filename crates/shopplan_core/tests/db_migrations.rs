use shopplan_core::db::migrations::latest_version;
use shopplan_core::db::{open_db, open_db_in_memory};

fn table_columns(conn: &rusqlite::Connection, table: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table});"))
        .unwrap();
    let mut rows = stmt.query([]).unwrap();
    let mut columns = Vec::new();
    while let Some(row) = rows.next().unwrap() {
        let column: String = row.get(1).unwrap();
        columns.push(column);
    }
    columns
}

#[test]
fn open_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
}

#[test]
fn open_enables_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn migration_1_creates_planning_tables() {
    let conn = open_db_in_memory().unwrap();

    for table in ["tasks", "resources", "assignments"] {
        let exists: i64 = conn
            .query_row(
                "SELECT EXISTS(
                    SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
                );",
                [table],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(exists, 1, "table `{table}` should exist");
    }

    let task_columns = table_columns(&conn, "tasks");
    for column in ["uuid", "seq", "name", "depth", "start_ms", "finish_ms", "warehouse", "manager"]
    {
        assert!(
            task_columns.contains(&column.to_string()),
            "tasks should have column `{column}`"
        );
    }

    let assignment_columns = table_columns(&conn, "assignments");
    assert!(assignment_columns.contains(&"task_uuid".to_string()));
    assert!(assignment_columns.contains(&"resource_uuid".to_string()));
}

#[test]
fn migration_2_adds_resource_detail_columns() {
    let conn = open_db_in_memory().unwrap();

    let resource_columns = table_columns(&conn, "resources");
    for column in ["model", "max_value", "notes"] {
        assert!(
            resource_columns.contains(&column.to_string()),
            "resources should have column `{column}`"
        );
    }
}

#[test]
fn open_db_bootstraps_a_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.db");

    let conn = open_db(&path).unwrap();
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
    assert!(path.exists());

    // Reopening an already-migrated file is a no-op.
    drop(conn);
    let reopened = open_db(&path).unwrap();
    let version: u32 = reopened
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
}
