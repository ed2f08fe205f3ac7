//! History reads and writes

use crate::common::*;
use haystackdb::{
    Dict, Error, HistoryBackend, HistoryConfig, Ref, ServerConfig, Status, Table, Value,
    ZonedDateTime,
};

fn his_read(executor: &haystackdb::Executor, id: &str, range: &str) -> Result<Table, Error> {
    executor.execute(
        "hisRead",
        &one_row(Dict::new().with("id", Ref::new(id)).with("range", range)),
    )
}

fn samples(id: &str, items: &[(&str, Value)]) -> Table {
    let rows: Vec<Dict> = items
        .iter()
        .map(|(ts, val)| {
            Dict::new()
                .with("ts", ZonedDateTime::parse(ts).unwrap())
                .with("val", val.clone())
        })
        .collect();
    Table::from_dicts(&rows).with_meta(Dict::new().with("id", Ref::new(id)))
}

fn memory_executor() -> haystackdb::Executor {
    create_executor_with(ServerConfig {
        history: HistoryConfig {
            backend: HistoryBackend::Memory,
            ..HistoryConfig::default()
        },
        ..ServerConfig::default()
    })
}

#[test]
fn synthetic_range_is_start_exclusive_end_inclusive() {
    let executor = create_executor();
    let t = his_read(&executor, "pt-3", "2024-03-10,2024-03-11").unwrap();
    assert_eq!(t.num_rows(), 2 * 96);

    let start = t.meta().get("hisStart").and_then(Value::as_datetime).unwrap().clone();
    let end = t.meta().get("hisEnd").and_then(Value::as_datetime).unwrap().clone();
    let stamps: Vec<ZonedDateTime> = t
        .rows()
        .filter_map(|r| r.get("ts").and_then(Value::as_datetime).cloned())
        .collect();
    assert!(stamps.iter().all(|ts| *ts > start && *ts <= end));
    assert_eq!(stamps.last(), Some(&end));
    assert!(stamps.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn response_meta_carries_id_with_dis() {
    let executor = create_executor();
    executor
        .database()
        .store()
        .put(
            Dict::new()
                .with("id", Ref::new("pt-9"))
                .with_marker("his")
                .with("dis", "Zone Temp"),
        )
        .unwrap();
    let t = his_read(&executor, "pt-9", "2024-01-01").unwrap();
    let id_ref = t.meta().get("id").and_then(Value::as_entity_ref).unwrap();
    assert_eq!(id_ref.id.as_str(), "pt-9");
    assert_eq!(id_ref.dis.as_deref(), Some("Zone Temp"));
}

#[test]
fn synthetic_backend_rejects_writes() {
    let executor = create_executor();
    let err = executor
        .execute(
            "hisWrite",
            &samples("pt-3", &[("2024-01-01T00:15:00Z", Value::number(1.0))]),
        )
        .unwrap_err();
    assert_eq!(err.status(), Status::Unsupported);
}

#[test]
fn memory_backend_round_trip() {
    let executor = memory_executor();
    executor
        .execute(
            "hisWrite",
            &samples(
                "pt-2",
                &[
                    ("2024-01-01T12:00:00Z", Value::Bool(true)),
                    ("2024-01-01T06:00:00Z", Value::Bool(false)),
                ],
            ),
        )
        .unwrap();
    let t = his_read(&executor, "pt-2", "2024-01-01T00:00:00Z,2024-01-02T00:00:00Z").unwrap();
    let vals: Vec<&Value> = t.rows().filter_map(|r| r.get("val")).collect();
    assert_eq!(vals, vec![&Value::Bool(false), &Value::Bool(true)]);
}

#[test]
fn rewrite_replaces_sample_at_same_timestamp() {
    let executor = memory_executor();
    for val in [1.0, 2.0] {
        executor
            .execute(
                "hisWrite",
                &samples("pt-3", &[("2024-01-01T06:00:00Z", Value::number(val))]),
            )
            .unwrap();
    }
    let t = his_read(&executor, "pt-3", "2024-01-01").unwrap();
    assert_eq!(t.num_rows(), 1);
    assert_eq!(t.row(0).unwrap().get("val"), Some(&Value::number(2.0)));
}

#[test]
fn bad_ranges_are_malformed() {
    let executor = create_executor();
    for range in ["", "tomorrowish", "2024-13-01", "2024-01-03,2024-01-01"] {
        assert!(
            matches!(
                his_read(&executor, "pt-3", range),
                Err(Error::MalformedRequest { .. })
            ),
            "range {:?}",
            range
        );
    }
}

#[test]
fn zero_width_range_on_memory_backend_is_empty() {
    let executor = memory_executor();
    executor
        .execute(
            "hisWrite",
            &samples("pt-3", &[("2024-01-01T00:00:00Z", Value::number(1.0))]),
        )
        .unwrap();
    let t = his_read(&executor, "pt-3", "2024-01-01T00:00:00Z,2024-01-01T00:00:00Z").unwrap();
    assert!(t.is_empty());
}

#[test]
fn synthetic_range_too_large_is_bad_request() {
    let executor = create_executor();
    let err = his_read(&executor, "pt-3", "0001-01-01,9999-12-31").unwrap_err();
    assert!(matches!(err, Error::MalformedRequest { .. }));
    assert_eq!(err.status(), Status::BadRequest);
}
