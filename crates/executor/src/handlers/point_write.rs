//! Priority array handler.

use tracing::info;

use haystack_core::Table;
use haystack_engine::Database;

use crate::convert::convert_result;
use crate::request::{first_row, row_id};
use crate::{Error, Result};

/// Writer recorded when a request names none
pub const DEFAULT_WHO: &str = "unknown";

/// Handle `pointWrite`.
///
/// Row 0 names the point. With a `level`, `val` (absent to relinquish) is
/// written there on behalf of `who`. The current array is always returned.
pub fn point_write(db: &Database, req: &Table) -> Result<Table> {
    let row = first_row(req)?;
    let id = row_id(&row, "id")?;
    convert_result(db.entity(&id))?;

    if let Some(level) = row.get("level") {
        let level = level
            .as_number()
            .and_then(|n| n.as_int())
            .and_then(|n| u8::try_from(n).ok())
            .ok_or_else(|| Error::malformed("'level' must be an integer 1-17"))?;
        let val = row.get("val").cloned();
        let who = row.get_str("who").unwrap_or(DEFAULT_WHO).to_string();
        let event = convert_result(db.register().write(&id, level, val, Some(who)))?;
        info!(
            target: "haystack::point_write",
            id = %event.id,
            level = event.level,
            val = ?event.val,
            who = ?event.who,
            "pointWrite"
        );
    }
    Ok(db.register().table(&id))
}
