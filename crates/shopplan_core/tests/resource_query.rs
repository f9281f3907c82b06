use shopplan_core::db::open_db_in_memory;
use shopplan_core::{
    query_resources, AppendResourceRequest, AppendTaskRequest, QueryError, ResourceCategory,
    ResourceService, ResourceView, ResourceQuery, SqliteResourceRepository, SqliteTaskRepository,
    TaskService,
};

/// Epoch-ms instant for an hour:minute wall-clock time.
fn hm(hours: i64, minutes: i64) -> i64 {
    (hours * 60 + minutes) * 60_000
}

fn setup() -> rusqlite::Connection {
    open_db_in_memory().unwrap()
}

fn resource_service(conn: &rusqlite::Connection) -> ResourceService<SqliteResourceRepository<'_>> {
    ResourceService::new(SqliteResourceRepository::try_new(conn).unwrap())
}

fn names(views: &[ResourceView]) -> Vec<&str> {
    views.iter().map(|view| view.name.as_str()).collect()
}

/// Seeds the end-to-end scenario: two W1 spindles, one drill task from
/// 09:00 to 10:00 occupying the smaller one.
fn seed_drill_scenario(conn: &rusqlite::Connection) -> (uuid::Uuid, uuid::Uuid) {
    let resources = resource_service(conn);
    let tasks = TaskService::new(SqliteTaskRepository::try_new(conn).unwrap());

    let small = resources
        .append_resource(&AppendResourceRequest {
            diameter: Some(5.0),
            ..AppendResourceRequest::new("Spindle A", "Spindle", "W1")
        })
        .unwrap();
    let large = resources
        .append_resource(&AppendResourceRequest {
            diameter: Some(8.0),
            ..AppendResourceRequest::new("Spindle B", "Spindle", "W1")
        })
        .unwrap();

    let drill = tasks
        .append_task(&AppendTaskRequest {
            name: "Drill".to_string(),
            start_ms: hm(9, 0),
            finish_ms: hm(10, 0),
            warehouse: "W1".to_string(),
            manager: "PM".to_string(),
            parent: None,
        })
        .unwrap();
    tasks.assign_resources(drill.uuid, &[small.uuid]).unwrap();

    (small.uuid, large.uuid)
}

#[test]
fn empty_predicate_set_returns_every_resource_in_insertion_order() {
    let conn = setup();
    let resources = resource_service(&conn);
    for name in ["Gamma", "Alpha", "Beta"] {
        resources
            .append_resource(&AppendResourceRequest::new(name, "Mask", "W1"))
            .unwrap();
    }

    let views = query_resources(&conn, &ResourceQuery::default()).unwrap();
    assert_eq!(names(&views), vec!["Gamma", "Alpha", "Beta"]);
}

#[test]
fn no_match_is_an_empty_sequence_not_an_error() {
    let conn = setup();

    let views = query_resources(
        &conn,
        &ResourceQuery {
            category: Some(ResourceCategory::Generator),
            ..ResourceQuery::default()
        },
    )
    .unwrap();
    assert!(views.is_empty());
}

#[test]
fn exact_match_filters_compose_with_and_semantics() {
    let conn = setup();
    let resources = resource_service(&conn);

    resources
        .append_resource(&AppendResourceRequest {
            pitch: Some(1.25),
            model: Some("HX-200".to_string()),
            ..AppendResourceRequest::new("Probe W1", "Probe-tip", "W1")
        })
        .unwrap();
    resources
        .append_resource(&AppendResourceRequest {
            pitch: Some(1.25),
            model: Some("HX-200".to_string()),
            ..AppendResourceRequest::new("Probe W2", "Probe-tip", "W2")
        })
        .unwrap();
    resources
        .append_resource(&AppendResourceRequest {
            pitch: Some(2.5),
            center_to_center: Some(7.5),
            ..AppendResourceRequest::new("Coarse probe", "Probe-tip", "W1")
        })
        .unwrap();

    let views = query_resources(
        &conn,
        &ResourceQuery {
            warehouse: Some("W1".to_string()),
            pitch: Some(1.25),
            model: Some("HX-200".to_string()),
            ..ResourceQuery::default()
        },
    )
    .unwrap();
    assert_eq!(names(&views), vec!["Probe W1"]);

    let views = query_resources(
        &conn,
        &ResourceQuery {
            center_to_center: Some(7.5),
            ..ResourceQuery::default()
        },
    )
    .unwrap();
    assert_eq!(names(&views), vec!["Coarse probe"]);
}

#[test]
fn diameter_bounds_are_inclusive() {
    let conn = setup();
    let resources = resource_service(&conn);
    for (name, diameter) in [("d4", 4.0), ("d6", 6.0), ("d8", 8.0)] {
        resources
            .append_resource(&AppendResourceRequest {
                diameter: Some(diameter),
                ..AppendResourceRequest::new(name, "Spindle", "W1")
            })
            .unwrap();
    }

    let views = query_resources(
        &conn,
        &ResourceQuery {
            min_diameter: Some(6.0),
            max_diameter: Some(8.0),
            ..ResourceQuery::default()
        },
    )
    .unwrap();
    assert_eq!(names(&views), vec!["d6", "d8"]);
}

#[test]
fn unset_diameter_never_satisfies_a_bound() {
    let conn = setup();
    let resources = resource_service(&conn);
    resources
        .append_resource(&AppendResourceRequest::new("Unmeasured", "Spindle", "W1"))
        .unwrap();
    resources
        .append_resource(&AppendResourceRequest {
            diameter: Some(0.0),
            ..AppendResourceRequest::new("Zeroed", "Spindle", "W1")
        })
        .unwrap();

    let views = query_resources(
        &conn,
        &ResourceQuery {
            min_diameter: Some(0.0),
            ..ResourceQuery::default()
        },
    )
    .unwrap();
    // Measured-as-zero matches the bound; never-measured does not.
    assert_eq!(names(&views), vec!["Zeroed"]);
}

#[test]
fn query_is_idempotent_without_intervening_mutation() {
    let conn = setup();
    seed_drill_scenario(&conn);

    let query = ResourceQuery {
        category: Some(ResourceCategory::Spindle),
        available_from: Some(hm(9, 0)),
        available_until: Some(hm(10, 0)),
        ..ResourceQuery::default()
    };
    let first = query_resources(&conn, &query).unwrap();
    let second = query_resources(&conn, &query).unwrap();
    assert_eq!(first, second);
}

#[test]
fn adding_a_predicate_never_grows_the_result() {
    let conn = setup();
    seed_drill_scenario(&conn);

    let base = ResourceQuery {
        category: Some(ResourceCategory::Spindle),
        ..ResourceQuery::default()
    };
    let narrowed = ResourceQuery {
        min_diameter: Some(6.0),
        ..base.clone()
    };

    let base_views = query_resources(&conn, &base).unwrap();
    let narrowed_views = query_resources(&conn, &narrowed).unwrap();

    assert!(narrowed_views.len() <= base_views.len());
    for view in &narrowed_views {
        assert!(base_views.contains(view));
    }
}

#[test]
fn one_sided_window_is_ignored() {
    let conn = setup();
    let (small, _large) = seed_drill_scenario(&conn);

    // The small spindle is busy 09:00-10:00, but with only one bound given
    // the availability predicate must not apply.
    let views = query_resources(
        &conn,
        &ResourceQuery {
            available_from: Some(hm(9, 0)),
            ..ResourceQuery::default()
        },
    )
    .unwrap();
    assert_eq!(views.len(), 2);

    let small_name = resource_service(&conn)
        .get_resource(small)
        .unwrap()
        .unwrap()
        .name;
    assert!(names(&views).contains(&small_name.as_str()));
}

#[test]
fn inverted_window_is_a_validation_error() {
    let conn = setup();
    seed_drill_scenario(&conn);

    let err = query_resources(
        &conn,
        &ResourceQuery {
            available_from: Some(hm(10, 0)),
            available_until: Some(hm(9, 0)),
            ..ResourceQuery::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, QueryError::InvalidWindow { .. }));
}

#[test]
fn drill_scenario_end_to_end() {
    let conn = setup();
    let (small, _large) = seed_drill_scenario(&conn);

    let views = query_resources(
        &conn,
        &ResourceQuery {
            category: Some(ResourceCategory::Spindle),
            min_diameter: Some(6.0),
            ..ResourceQuery::default()
        },
    )
    .unwrap();
    assert_eq!(names(&views), vec!["Spindle B"]);

    assert!(!shopplan_core::is_available(&conn, small, hm(9, 30), hm(9, 45)).unwrap());
    assert!(shopplan_core::is_available(&conn, small, hm(10, 0), hm(10, 30)).unwrap());

    let free_now = query_resources(
        &conn,
        &ResourceQuery {
            category: Some(ResourceCategory::Spindle),
            available_from: Some(hm(9, 30)),
            available_until: Some(hm(9, 45)),
            ..ResourceQuery::default()
        },
    )
    .unwrap();
    assert_eq!(names(&free_now), vec!["Spindle B"]);

    let free_later = query_resources(
        &conn,
        &ResourceQuery {
            category: Some(ResourceCategory::Spindle),
            available_from: Some(hm(10, 0)),
            available_until: Some(hm(10, 30)),
            ..ResourceQuery::default()
        },
    )
    .unwrap();
    assert_eq!(names(&free_later), vec!["Spindle A", "Spindle B"]);
}
