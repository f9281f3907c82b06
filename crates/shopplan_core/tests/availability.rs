use shopplan_core::db::open_db_in_memory;
use shopplan_core::schedule::availability::{is_available, AvailabilityError};
use shopplan_core::{
    AppendResourceRequest, AppendTaskRequest, ResourceService, SqliteResourceRepository,
    SqliteTaskRepository, TaskId, TaskService,
};
use uuid::Uuid;

/// Epoch-ms instant for an hour:minute wall-clock time.
fn hm(hours: i64, minutes: i64) -> i64 {
    (hours * 60 + minutes) * 60_000
}

struct Fixture {
    conn: rusqlite::Connection,
}

impl Fixture {
    fn new() -> Self {
        Self {
            conn: open_db_in_memory().unwrap(),
        }
    }

    fn tasks(&self) -> TaskService<SqliteTaskRepository<'_>> {
        TaskService::new(SqliteTaskRepository::try_new(&self.conn).unwrap())
    }

    fn resources(&self) -> ResourceService<SqliteResourceRepository<'_>> {
        ResourceService::new(SqliteResourceRepository::try_new(&self.conn).unwrap())
    }

    fn add_resource(&self, name: &str) -> Uuid {
        self.resources()
            .append_resource(&AppendResourceRequest::new(name, "Spindle", "W1"))
            .unwrap()
            .uuid
    }

    fn add_assigned_task(&self, name: &str, start_ms: i64, finish_ms: i64, resource: Uuid) -> TaskId {
        let tasks = self.tasks();
        let task = tasks
            .append_task(&AppendTaskRequest {
                name: name.to_string(),
                start_ms,
                finish_ms,
                warehouse: "W1".to_string(),
                manager: "PM".to_string(),
                parent: None,
            })
            .unwrap();
        tasks.assign_resources(task.uuid, &[resource]).unwrap();
        task.uuid
    }
}

#[test]
fn resource_without_assignments_is_available() {
    let fixture = Fixture::new();
    let spindle = fixture.add_resource("Spindle 01");

    assert!(is_available(&fixture.conn, spindle, hm(9, 0), hm(17, 0)).unwrap());
}

#[test]
fn window_overlapping_an_assignment_conflicts() {
    let fixture = Fixture::new();
    let spindle = fixture.add_resource("Spindle 01");
    fixture.add_assigned_task("Drill", hm(9, 0), hm(10, 0), spindle);

    // Strictly inside.
    assert!(!is_available(&fixture.conn, spindle, hm(9, 30), hm(9, 45)).unwrap());
    // Straddling the start.
    assert!(!is_available(&fixture.conn, spindle, hm(8, 30), hm(9, 30)).unwrap());
    // Straddling the finish.
    assert!(!is_available(&fixture.conn, spindle, hm(9, 45), hm(10, 30)).unwrap());
    // Covering the whole assignment.
    assert!(!is_available(&fixture.conn, spindle, hm(8, 0), hm(11, 0)).unwrap());
}

#[test]
fn touching_endpoints_do_not_conflict() {
    let fixture = Fixture::new();
    let spindle = fixture.add_resource("Spindle 01");
    fixture.add_assigned_task("Morning run", hm(10, 0), hm(11, 0), spindle);

    assert!(is_available(&fixture.conn, spindle, hm(11, 0), hm(12, 0)).unwrap());
    assert!(is_available(&fixture.conn, spindle, hm(9, 0), hm(10, 0)).unwrap());
}

#[test]
fn any_conflicting_assignment_makes_the_resource_busy() {
    let fixture = Fixture::new();
    let spindle = fixture.add_resource("Spindle 01");
    fixture.add_assigned_task("Morning run", hm(9, 0), hm(10, 0), spindle);
    fixture.add_assigned_task("Afternoon run", hm(13, 0), hm(14, 0), spindle);

    assert!(is_available(&fixture.conn, spindle, hm(10, 0), hm(13, 0)).unwrap());
    assert!(!is_available(&fixture.conn, spindle, hm(13, 30), hm(15, 0)).unwrap());
}

#[test]
fn unknown_resource_is_signaled_not_silently_available() {
    let fixture = Fixture::new();
    let missing = Uuid::new_v4();

    let err = is_available(&fixture.conn, missing, hm(9, 0), hm(10, 0)).unwrap_err();
    assert!(matches!(err, AvailabilityError::ResourceNotFound(id) if id == missing));
}

#[test]
fn inverted_window_is_rejected() {
    let fixture = Fixture::new();
    let spindle = fixture.add_resource("Spindle 01");

    let err = is_available(&fixture.conn, spindle, hm(12, 0), hm(9, 0)).unwrap_err();
    assert!(matches!(err, AvailabilityError::InvalidWindow { .. }));
}

#[test]
fn deleting_the_task_frees_the_resource() {
    let fixture = Fixture::new();
    let spindle = fixture.add_resource("Spindle 01");
    let task = fixture.add_assigned_task("Drill", hm(9, 0), hm(10, 0), spindle);

    assert!(!is_available(&fixture.conn, spindle, hm(9, 15), hm(9, 45)).unwrap());

    fixture.tasks().delete_task(task).unwrap();
    assert!(is_available(&fixture.conn, spindle, hm(9, 15), hm(9, 45)).unwrap());
}
