//! Request shape helpers shared by the handlers.
//!
//! Ids may be sent as Refs or as plain strings; both are accepted.

use haystack_core::{EntityId, Row, Table, Value};

use crate::{Error, Result};

/// First row, or `MalformedRequest` for an empty request
pub(crate) fn first_row(req: &Table) -> Result<Row<'_>> {
    req.row(0)
        .ok_or_else(|| Error::malformed("Request has no rows"))
}

/// Interpret a cell as an entity id
pub(crate) fn value_to_id(val: &Value) -> Result<EntityId> {
    match val {
        Value::Ref(r) => Ok(r.id.clone()),
        Value::Str(s) => Ok(EntityId::parse(s)?),
        other => Err(Error::malformed(format!(
            "Expected Ref id, found {}",
            other.type_name()
        ))),
    }
}

/// Required id cell of `row`
pub(crate) fn row_id(row: &Row<'_>, col: &str) -> Result<EntityId> {
    let val = row
        .get(col)
        .ok_or_else(|| Error::malformed(format!("Missing '{}'", col)))?;
    value_to_id(val)
}

/// The `id` column of every row, in row order
pub(crate) fn ids(req: &Table) -> Result<Vec<EntityId>> {
    if !req.is_empty() && !req.has_col("id") {
        return Err(Error::malformed("Missing 'id' column"));
    }
    req.rows()
        .enumerate()
        .map(|(i, row)| {
            let val = row
                .get("id")
                .ok_or_else(|| Error::malformed(format!("Row {} missing 'id'", i)))?;
            value_to_id(val)
        })
        .collect()
}

/// Required Str tag of the request meta
pub(crate) fn meta_str<'a>(req: &'a Table, name: &str) -> Result<&'a str> {
    req.meta()
        .get_str(name)
        .ok_or_else(|| Error::malformed(format!("Missing meta '{}'", name)))
}
