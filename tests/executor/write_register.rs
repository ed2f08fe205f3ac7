//! Priority write register through `pointWrite`

use crate::common::*;
use haystack_engine::{HighestLevelWins, LEVELS};
use haystackdb::{Dict, EntityId, Number, Ref, Table, Value};

fn write(level: i64, val: Option<Value>, who: Option<&str>) -> Table {
    let mut row = Dict::new().with("id", Ref::new("pt-1")).with("level", level);
    if let Some(val) = val {
        row.set("val", val);
    }
    if let Some(who) = who {
        row.set("who", who);
    }
    one_row(row)
}

#[test]
fn operator_override_at_level_one() {
    let executor = create_executor();
    let t = executor
        .execute(
            "pointWrite",
            &write(1, Some(Value::number(72.0)), Some("operatorA")),
        )
        .unwrap();

    assert_eq!(t.num_rows(), LEVELS);
    let first = t.row(0).unwrap();
    assert_eq!(first.get_number("level").and_then(Number::as_int), Some(1));
    assert_eq!(first.get("val"), Some(&Value::number(72.0)));
    assert_eq!(first.get_str("who"), Some("operatorA"));
    for row in t.rows().skip(1) {
        assert!(row.missing("val"));
        assert!(row.missing("who"));
    }
}

#[test]
fn read_only_request_returns_array() {
    let executor = create_executor();
    let t = executor.execute("pointWrite", &id_rows(&["pt-1"])).unwrap();
    assert_eq!(t.num_rows(), LEVELS);
    let levels: Vec<String> = t
        .rows()
        .filter_map(|r| r.get_str("levelDis").map(str::to_string))
        .collect();
    assert_eq!(levels.first().map(String::as_str), Some("1"));
    assert_eq!(levels.last().map(String::as_str), Some("17"));
    assert!(t.rows().all(|r| r.missing("val")));
}

#[test]
fn relinquish_clears_value_and_writer() {
    let executor = create_executor();
    executor
        .execute("pointWrite", &write(8, Some(Value::Bool(true)), Some("sched")))
        .unwrap();
    let t = executor
        .execute("pointWrite", &write(8, None, Some("sched")))
        .unwrap();
    let row = t.row(7).unwrap();
    assert!(row.missing("val"));
    assert!(row.missing("who"));
}

#[test]
fn writer_defaults_to_unknown() {
    let executor = create_executor();
    let t = executor
        .execute("pointWrite", &write(16, Some(Value::number(55.0)), None))
        .unwrap();
    assert_eq!(t.row(15).unwrap().get_str("who"), Some("unknown"));
}

#[test]
fn register_does_not_arbitrate_on_its_own() {
    let executor = create_executor();
    executor
        .execute("pointWrite", &write(16, Some(Value::number(55.0)), None))
        .unwrap();
    executor
        .execute("pointWrite", &write(4, Some(Value::number(60.0)), None))
        .unwrap();

    let db = executor.database();
    let id = EntityId::new("pt-1");
    let entity = db.entity(&id).unwrap();
    assert_eq!(entity.get("curVal"), Some(&Value::number_with_unit(68.0, "°F")));

    let policy = HighestLevelWins::default();
    assert_eq!(db.register().arbitrate(&id, &policy), Some(Value::number(60.0)));
}
