//! History handlers.

use haystack_core::{DateTimeRange, Dict, HistoryItem, Ref, Table};
use haystack_engine::Database;

use crate::convert::convert_result;
use crate::request::{first_row, row_id, value_to_id};
use crate::{Error, Result};

/// Handle `hisRead`.
///
/// Row 0 carries `id` and a `range` expression. Dates in the range are
/// taken in the entity's `tz`, falling back to the server timezone.
pub fn his_read(db: &Database, req: &Table) -> Result<Table> {
    let row = first_row(req)?;
    let id = row_id(&row, "id")?;
    let range = row
        .get_str("range")
        .ok_or_else(|| Error::malformed("Missing 'range'"))?;
    let entity = convert_result(db.entity(&id))?;
    let tz = db.tz_of(&id);
    let range = convert_result(DateTimeRange::parse(range, &tz))?;
    let items = convert_result(db.history().his_read(&id, &range))?;

    let id_ref = match entity.get("dis").and_then(|v| v.as_str()) {
        Some(dis) => Ref::with_dis(id, dis),
        None => Ref::new(id),
    };
    let meta = Dict::new()
        .with("id", id_ref)
        .with("hisStart", range.start)
        .with("hisEnd", range.end);
    Ok(Table::from_history(meta, &items))
}

/// Handle `hisWrite`.
///
/// Meta `id` names the entity; rows carry `ts` and `val`.
pub fn his_write(db: &Database, req: &Table) -> Result<Table> {
    if req.is_empty() {
        return Err(Error::malformed("Request has no rows"));
    }
    let id = match req.meta().get("id") {
        Some(val) => value_to_id(val)?,
        None => return Err(Error::malformed("Missing meta 'id'")),
    };
    let items = convert_result(HistoryItem::from_table(req))?;
    convert_result(db.history().his_write(&id, &items))?;
    Ok(Table::empty())
}
