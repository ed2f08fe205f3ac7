//! Server metadata handlers.

use haystack_core::{Table, TableBuilder, Value};
use haystack_engine::Database;

use crate::operation::operations;
use crate::Result;

/// Mime type of the one supported grid format
pub const JSON_MIME: &str = "application/json";

/// Handle `about`.
pub fn about(db: &Database, _req: &Table) -> Result<Table> {
    Ok(Table::from_dict(&db.about()))
}

/// Handle `ops`.
pub fn ops(_db: &Database, _req: &Table) -> Result<Table> {
    let mut b = TableBuilder::new();
    b.add_col("name");
    b.add_col("summary");
    for op in operations() {
        b.add_row(vec![Some(Value::str(op.name)), Some(Value::str(op.summary))]);
    }
    Ok(b.build())
}

/// Handle `formats`.
pub fn formats(_db: &Database, _req: &Table) -> Result<Table> {
    let mut b = TableBuilder::new();
    b.add_col("mime");
    b.add_col("read");
    b.add_col("write");
    b.add_row(vec![
        Some(Value::str(JSON_MIME)),
        Some(Value::Marker),
        Some(Value::Marker),
    ]);
    Ok(b.build())
}
