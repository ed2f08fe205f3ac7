//! Concurrent and hostile usage

use std::sync::Arc;
use std::thread;

use crate::common::*;
use haystack_engine::LEVELS;
use haystackdb::{Dict, Number, Ref, Table, Value};

#[test]
fn concurrent_point_writes_land_on_their_levels() {
    let executor = Arc::new(create_executor());
    let handles: Vec<_> = (1..=LEVELS as i64)
        .map(|level| {
            let executor = Arc::clone(&executor);
            thread::spawn(move || {
                for round in 0..20 {
                    let req = one_row(
                        Dict::new()
                            .with("id", Ref::new("pt-1"))
                            .with("level", level)
                            .with("val", (level * 100 + round) as f64)
                            .with("who", format!("writer-{}", level)),
                    );
                    executor.execute("pointWrite", &req).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let t = executor.execute("pointWrite", &id_rows(&["pt-1"])).unwrap();
    for row in t.rows() {
        let level = row.get_number("level").and_then(Number::as_int).unwrap();
        assert_eq!(row.get("val"), Some(&Value::number((level * 100 + 19) as f64)));
        assert_eq!(row.get_str("who"), Some(format!("writer-{}", level).as_str()));
    }
}

#[test]
fn polling_while_store_changes() {
    let executor = Arc::new(create_executor());
    let req = id_rows(&["pt-1", "pt-3"]).with_meta(Dict::new().with("watchDis", "busy"));
    let t = executor.execute("watchSub", &req).unwrap();
    let watch_id = t.meta().get_str("watchId").unwrap().to_string();

    let writer = {
        let executor = Arc::clone(&executor);
        thread::spawn(move || {
            for i in 0..50 {
                executor
                    .database()
                    .store()
                    .put(
                        Dict::new()
                            .with("id", Ref::new("pt-3"))
                            .with_marker("point")
                            .with("curVal", f64::from(i)),
                    )
                    .unwrap();
            }
        })
    };
    let poll = Table::empty().with_meta(Dict::new().with("watchId", watch_id.as_str()));
    for _ in 0..50 {
        let t = executor.execute("watchPoll", &poll).unwrap();
        assert!(t.num_rows() <= 1);
    }
    writer.join().unwrap();

    // drain, then the final state is visible and stable
    executor.execute("watchPoll", &poll).unwrap();
    assert!(executor.execute("watchPoll", &poll).unwrap().is_empty());
    let refresh = Table::empty().with_meta(
        Dict::new()
            .with("watchId", watch_id.as_str())
            .with_marker("refresh"),
    );
    let all = executor.execute("watchPoll", &refresh).unwrap();
    let pt3 = all
        .rows()
        .find(|r| r.id().map(|id| id.as_str()) == Some("pt-3"))
        .unwrap();
    assert_eq!(pt3.get("curVal"), Some(&Value::number(49.0)));
}

#[test]
fn hostile_filters_are_rejected_not_panicking() {
    let executor = create_executor();
    for filter in [
        "",
        "(((",
        "site and and point",
        "a->",
        "curVal > ",
        "\"unterminated",
        "not",
        "@",
    ] {
        let req = one_row(Dict::new().with("filter", filter));
        assert!(executor.execute("read", &req).is_err(), "{:?}", filter);
    }
}

#[test]
fn many_watches_close_cleanly() {
    let executor = create_executor();
    let ids: Vec<String> = (0..32)
        .map(|i| {
            let req = id_rows(&["pt-1"]).with_meta(Dict::new().with("watchDis", format!("w{}", i)));
            let t = executor.execute("watchSub", &req).unwrap();
            t.meta().get_str("watchId").unwrap().to_string()
        })
        .collect();
    assert_eq!(executor.database().watches().len(), 32);
    for id in &ids {
        let close = Table::empty().with_meta(Dict::new().with("watchId", id.as_str()).with_marker("close"));
        executor.execute("watchUnsub", &close).unwrap();
    }
    assert!(executor.database().watches().is_empty());
}
