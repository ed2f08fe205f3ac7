//! Entity read handlers.

use haystack_core::Table;
use haystack_engine::{Database, EntityAccess};

use crate::convert::convert_result;
use crate::request::{first_row, ids, value_to_id};
use crate::{Error, Result};

/// Handle `read`.
///
/// Row 0 with `filter` (and optional `limit`) reads by filter; otherwise
/// every row's `id` is read, unchecked and positionally aligned.
pub fn read(db: &Database, req: &Table) -> Result<Table> {
    let row = first_row(req)?;
    if row.has("filter") {
        let filter = row
            .get_str("filter")
            .ok_or_else(|| Error::malformed("'filter' must be a Str"))?;
        let limit = match row.get("limit") {
            None => None,
            Some(val) => Some(to_limit(val.as_number().and_then(|n| n.as_int()))?),
        };
        convert_result(db.entities().read_all(filter, limit))
    } else if row.has("id") {
        let ids = ids(req)?;
        convert_result(db.entities().read_by_ids(&ids, false))
    } else {
        Err(Error::malformed("Missing filter or id columns"))
    }
}

fn to_limit(n: Option<i64>) -> Result<usize> {
    n.and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| Error::malformed("'limit' must be a non-negative integer"))
}

/// Handle `nav`.
///
/// Without a `navId` the roots (sites) are listed.
pub fn nav(db: &Database, req: &Table) -> Result<Table> {
    let nav_id = match req.row(0).and_then(|row| row.get("navId")) {
        Some(val) => Some(value_to_id(val)?),
        None => None,
    };
    convert_result(db.nav(nav_id.as_ref()))
}
