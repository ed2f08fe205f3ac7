//! Operation registry and path dispatch

use crate::common::*;
use haystackdb::{find_operation, operations, Error, Table};

const EXPECTED_OPS: [&str; 12] = [
    "about",
    "ops",
    "formats",
    "read",
    "nav",
    "watchSub",
    "watchUnsub",
    "watchPoll",
    "pointWrite",
    "hisRead",
    "hisWrite",
    "invokeAction",
];

#[test]
fn every_operation_is_registered_in_order() {
    let names: Vec<&str> = operations().iter().map(|op| op.name).collect();
    assert_eq!(names, EXPECTED_OPS);
    for name in EXPECTED_OPS {
        assert_eq!(find_operation(name).map(|op| op.name), Some(name));
    }
}

#[test]
fn ops_lists_the_registry() {
    let executor = create_executor();
    let t = executor.execute("ops", &Table::empty()).unwrap();
    let names: Vec<&str> = t.rows().filter_map(|r| r.get_str("name")).collect();
    assert_eq!(names, EXPECTED_OPS);
    assert!(t.rows().all(|r| r.get_str("summary").is_some()));
}

#[test]
fn lookup_is_case_sensitive() {
    let executor = create_executor();
    for name in ["Read", "hisread", "WATCHPOLL", ""] {
        match executor.execute(name, &Table::empty()) {
            Err(Error::UnknownOperation { op }) => assert_eq!(op, name),
            other => panic!("expected UnknownOperation for {:?}, got {:?}", name, other),
        }
    }
}

#[test]
fn empty_path_answers_about() {
    let executor = create_executor();
    let t = executor.execute_path("/", &Table::empty()).unwrap();
    assert_eq!(t.num_rows(), 1);
    assert_eq!(t.row(0).unwrap().get_str("haystackVersion"), Some("3.0"));
}

#[test]
fn path_dispatches_first_segment() {
    let executor = create_executor();
    let t = executor.execute_path("/formats?x=1", &Table::empty()).unwrap();
    assert_eq!(t.row(0).unwrap().get_str("mime"), Some("application/json"));
    assert!(matches!(
        executor.execute_path("/bogus/op", &Table::empty()),
        Err(Error::UnknownOperation { .. })
    ));
}

#[test]
fn execute_many_keeps_going_after_failure() {
    let executor = create_executor();
    let empty = Table::empty();
    let results = executor.execute_many([("about", &empty), ("nope", &empty), ("formats", &empty)]);
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert!(results[2].is_ok());
}

#[test]
fn nav_walks_the_building() {
    let executor = create_executor();
    let roots = executor.execute("nav", &Table::empty()).unwrap();
    assert_eq!(row_ids(&roots), vec![Some("site-1".to_string())]);
    assert_eq!(roots.row(0).unwrap().get_str("navId"), Some("site-1"));

    let equips = executor
        .execute("nav", &one_row(haystackdb::Dict::new().with("navId", "site-1")))
        .unwrap();
    assert_eq!(row_ids(&equips), vec![Some("ahu-1".to_string())]);

    let points = executor
        .execute("nav", &one_row(haystackdb::Dict::new().with("navId", "ahu-1")))
        .unwrap();
    assert_eq!(points.num_rows(), 3);
}

#[test]
fn invoke_action_on_known_entity() {
    let executor = create_executor();
    let req = one_row(
        haystackdb::Dict::new()
            .with("id", haystackdb::Ref::new("ahu-1"))
            .with("mode", "occupied"),
    )
    .with_meta(haystackdb::Dict::new().with("action", "setMode"));
    assert!(executor.execute("invokeAction", &req).unwrap().is_empty());
}
