//! Watch subscription lifecycle

use std::thread;
use std::time::Duration;

use crate::common::*;
use haystack_storage::EntityStore;
use haystackdb::{Dict, Error, Executor, Number, ServerConfig, Table, Value};

fn subscribe(executor: &Executor, ids: &[&str]) -> String {
    let req = id_rows(ids).with_meta(Dict::new().with("watchDis", "lifecycle"));
    let t = executor.execute("watchSub", &req).unwrap();
    t.meta().get_str("watchId").unwrap().to_string()
}

fn poll(executor: &Executor, watch_id: &str) -> Result<Table, Error> {
    executor.execute(
        "watchPoll",
        &Table::empty().with_meta(Dict::new().with("watchId", watch_id)),
    )
}

fn refresh(executor: &Executor, watch_id: &str) -> Result<Table, Error> {
    executor.execute(
        "watchPoll",
        &Table::empty().with_meta(
            Dict::new()
                .with("watchId", watch_id)
                .with_marker("refresh"),
        ),
    )
}

fn bump(executor: &Executor, id: &str, val: f64) {
    let store = executor.database().store();
    let current = store
        .entities()
        .into_iter()
        .find(|e| e.id().map(|i| i.as_str()) == Some(id))
        .unwrap();
    store.put((*current).clone().with("curVal", val)).unwrap();
}

#[test]
fn sub_poll_mutate_poll_refresh() {
    let executor = create_executor();
    let watch_id = subscribe(&executor, &["pt-1", "pt-2", "pt-3"]);

    assert!(poll(&executor, &watch_id).unwrap().is_empty());

    bump(&executor, "pt-2", 1.0);
    let changed = poll(&executor, &watch_id).unwrap();
    assert_eq!(row_ids(&changed), vec![Some("pt-2".to_string())]);

    assert!(poll(&executor, &watch_id).unwrap().is_empty());
    assert_eq!(refresh(&executor, &watch_id).unwrap().num_rows(), 3);
}

#[test]
fn entity_removed_after_sub_is_dropped_from_refresh() {
    let executor = create_executor();
    let watch_id = subscribe(&executor, &["pt-1", "pt-3"]);
    executor
        .database()
        .store()
        .remove(&haystackdb::EntityId::new("pt-3"));
    let t = refresh(&executor, &watch_id).unwrap();
    assert_eq!(row_ids(&t), vec![Some("pt-1".to_string())]);
}

#[test]
fn unsub_of_unknown_id_changes_nothing() {
    let executor = create_executor();
    let watch_id = subscribe(&executor, &["pt-1"]);
    let req = id_rows(&["pt-3", "ghost"]).with_meta(Dict::new().with("watchId", watch_id.as_str()));
    executor.execute("watchUnsub", &req).unwrap();
    assert_eq!(refresh(&executor, &watch_id).unwrap().num_rows(), 1);
}

#[test]
fn closed_watch_behaves_as_nonexistent() {
    let executor = create_executor();
    let watch_id = subscribe(&executor, &["pt-1"]);
    let close = Table::empty().with_meta(
        Dict::new()
            .with("watchId", watch_id.as_str())
            .with_marker("close"),
    );
    executor.execute("watchUnsub", &close).unwrap();

    assert!(matches!(poll(&executor, &watch_id), Err(Error::UnknownWatch { .. })));
    assert!(matches!(refresh(&executor, &watch_id), Err(Error::UnknownWatch { .. })));
    let resub = id_rows(&["pt-1"]).with_meta(Dict::new().with("watchId", watch_id.as_str()));
    assert!(matches!(
        executor.execute("watchSub", &resub),
        Err(Error::UnknownWatch { .. })
    ));
    // unsub and close on a gone watch are silent
    executor.execute("watchUnsub", &close).unwrap();
}

#[test]
fn lease_expiry_closes_watch() {
    let executor = create_executor();
    let req = id_rows(&["pt-1"]).with_meta(
        Dict::new()
            .with("watchDis", "short")
            .with("lease", Value::number_with_unit(150.0, "ms")),
    );
    let t = executor.execute("watchSub", &req).unwrap();
    let watch_id = t.meta().get_str("watchId").unwrap().to_string();

    thread::sleep(Duration::from_millis(400));
    assert!(matches!(poll(&executor, &watch_id), Err(Error::UnknownWatch { .. })));
}

#[test]
fn watch_ids_are_unique() {
    let executor = create_executor();
    let a = subscribe(&executor, &["pt-1"]);
    let b = subscribe(&executor, &["pt-1"]);
    assert_ne!(a, b);
    assert_eq!(executor.database().watches().len(), 2);
}

#[test]
fn sub_reports_lease_in_seconds() {
    let executor = create_executor();
    let req = id_rows(&["pt-1"]).with_meta(Dict::new().with("watchDis", "default"));
    let t = executor.execute("watchSub", &req).unwrap();
    assert_eq!(
        t.meta().get_number("lease"),
        Some(&Number::with_unit(60.0, "s"))
    );
}

#[test]
fn oversized_lease_is_malformed() {
    let executor = create_executor();
    let req = id_rows(&["pt-1"]).with_meta(
        Dict::new()
            .with("watchDis", "huge")
            .with("lease", Value::number(1e20)),
    );
    assert!(matches!(
        executor.execute("watchSub", &req),
        Err(Error::MalformedRequest { .. })
    ));
    assert!(executor.database().watches().is_empty());
}

#[test]
fn lease_past_instant_range_never_expires() {
    let executor = create_executor();
    let req = id_rows(&["pt-1"]).with_meta(
        Dict::new()
            .with("watchDis", "forever")
            .with("lease", Value::number(1e19)),
    );
    let t = executor.execute("watchSub", &req).unwrap();
    let watch_id = t.meta().get_str("watchId").unwrap().to_string();
    assert!(poll(&executor, &watch_id).unwrap().is_empty());
    assert_eq!(executor.database().watches().sweep_expired(), 0);
}

#[test]
fn configured_lease_near_max_opens_watch() {
    let executor = create_executor_with(ServerConfig {
        watch_lease_secs: u64::MAX,
        ..ServerConfig::default()
    });
    let watch_id = subscribe(&executor, &["pt-1"]);
    assert_eq!(refresh(&executor, &watch_id).unwrap().num_rows(), 1);
}
