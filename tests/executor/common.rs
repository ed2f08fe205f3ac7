//! Common test utilities for executor tests

use std::sync::Arc;

use haystack_engine::{Database, ServerConfig};
use haystackdb::{Dict, Executor, Ref, Table, Value};

/// A small building: one site, one AHU, three points
pub fn building() -> Vec<Dict> {
    vec![
        Dict::new()
            .with("id", Ref::new("site-1"))
            .with_marker("site")
            .with("dis", "Headquarters")
            .with("area", Value::number_with_unit(12000.0, "ft²")),
        Dict::new()
            .with("id", Ref::new("ahu-1"))
            .with_marker("equip")
            .with_marker("ahu")
            .with("siteRef", Ref::new("site-1")),
        Dict::new()
            .with("id", Ref::new("pt-1"))
            .with_marker("point")
            .with_marker("writable")
            .with("equipRef", Ref::new("ahu-1"))
            .with("kind", "Number")
            .with("curVal", Value::number_with_unit(68.0, "°F")),
        Dict::new()
            .with("id", Ref::new("pt-2"))
            .with_marker("point")
            .with_marker("his")
            .with("equipRef", Ref::new("ahu-1"))
            .with("kind", "Bool")
            .with("tz", "New_York"),
        Dict::new()
            .with("id", Ref::new("pt-3"))
            .with_marker("point")
            .with_marker("his")
            .with("equipRef", Ref::new("ahu-1"))
            .with("kind", "Number"),
    ]
}

/// Create an executor over `building()` with `config`
pub fn create_executor_with(config: ServerConfig) -> Executor {
    let db = Database::with_store(config, Arc::new(Default::default())).unwrap();
    for entity in building() {
        db.store().put(entity).unwrap();
    }
    Executor::new(db)
}

/// Create an executor over `building()` with default settings
pub fn create_executor() -> Executor {
    create_executor_with(ServerConfig::default())
}

/// Create an executor over an empty database
#[allow(dead_code)]
pub fn create_empty_executor() -> Executor {
    Executor::new(Database::ephemeral().unwrap())
}

/// Request table of `id` rows
pub fn id_rows(ids: &[&str]) -> Table {
    Table::from_dicts(ids.iter().map(|id| Dict::new().with("id", Ref::new(*id))))
}

/// Request table with a single row
pub fn one_row(row: Dict) -> Table {
    Table::from_dicts([row])
}

/// Ids of the rows of `t`, `None` for rows without one
pub fn row_ids(t: &Table) -> Vec<Option<String>> {
    t.rows()
        .map(|r| r.id().map(|id| id.as_str().to_string()))
        .collect()
}
