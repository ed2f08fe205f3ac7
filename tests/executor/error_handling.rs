//! Error Handling Tests
//!
//! Every error surfaces as a typed variant with a stable status.

use crate::common::*;
use haystackdb::{Dict, Error, Ref, Status, Table, Value};

#[test]
fn unknown_targets_are_not_found() {
    let executor = create_executor();
    let cases = [
        executor.execute("nope", &Table::empty()),
        executor.execute(
            "hisRead",
            &one_row(Dict::new().with("id", Ref::new("ghost")).with("range", "today")),
        ),
        executor.execute(
            "watchPoll",
            &Table::empty().with_meta(Dict::new().with("watchId", "missing")),
        ),
        executor.execute(
            "pointWrite",
            &one_row(Dict::new().with("id", Ref::new("ghost"))),
        ),
    ];
    for result in cases {
        let err = result.unwrap_err();
        assert_eq!(err.status(), Status::NotFound, "{:?}", err);
    }
}

#[test]
fn malformed_requests_are_bad_request() {
    let executor = create_executor();
    let cases = [
        ("read", Table::empty()),
        ("read", one_row(Dict::new().with("filter", "site and"))),
        ("read", one_row(Dict::new().with("filter", "site").with("limit", -1))),
        ("read", one_row(Dict::new().with("other", 1))),
        ("hisRead", one_row(Dict::new().with("id", Ref::new("pt-3")))),
        ("watchSub", id_rows(&["pt-1"])),
        ("watchPoll", Table::empty()),
        (
            "pointWrite",
            one_row(Dict::new().with("id", Ref::new("pt-1")).with("level", 18)),
        ),
        (
            "pointWrite",
            one_row(Dict::new().with("id", Ref::new("pt-1")).with("level", "high")),
        ),
        ("invokeAction", id_rows(&["pt-1"])),
    ];
    for (op, req) in cases {
        let err = executor.execute(op, &req).unwrap_err();
        assert!(
            matches!(err, Error::MalformedRequest { .. }),
            "{}: expected MalformedRequest, got {:?}",
            op,
            err
        );
        assert_eq!(err.status(), Status::BadRequest);
    }
}

#[test]
fn failed_write_leaves_register_unchanged() {
    let executor = create_executor();
    let write = |level: i64, val: f64| {
        executor.execute(
            "pointWrite",
            &one_row(
                Dict::new()
                    .with("id", Ref::new("pt-1"))
                    .with("level", level)
                    .with("val", val),
            ),
        )
    };
    write(10, 50.0).unwrap();
    assert!(write(0, 99.0).is_err());
    let t = executor
        .execute("pointWrite", &id_rows(&["pt-1"]))
        .unwrap();
    let written: Vec<&Value> = t.rows().filter_map(|r| r.get("val")).collect();
    assert_eq!(written, vec![&Value::number(50.0)]);
}

#[test]
fn error_messages_name_the_target() {
    let executor = create_executor();
    let err = executor
        .execute(
            "hisRead",
            &one_row(Dict::new().with("id", Ref::new("ghost")).with("range", "today")),
        )
        .unwrap_err();
    assert!(err.to_string().contains("ghost"), "{}", err);
}
