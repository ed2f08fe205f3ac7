//! Action handler.

use haystack_core::{Dict, Table};
use haystack_engine::Database;

use crate::convert::convert_result;
use crate::request::{meta_str, row_id, value_to_id};
use crate::{Error, Result};

/// Handle `invokeAction`.
///
/// Meta `action` names the action. The target is row 0's `id` (or meta
/// `id`); the remaining row 0 tags are the action's arguments.
pub fn invoke_action(db: &Database, req: &Table) -> Result<Table> {
    let action = meta_str(req, "action")?;
    let row = req.row(0);
    let id = match (req.meta().get("id"), &row) {
        (Some(val), _) => value_to_id(val)?,
        (None, Some(row)) => row_id(row, "id")?,
        (None, None) => return Err(Error::malformed("Missing target 'id'")),
    };
    let mut args = row.map(|r| r.to_dict()).unwrap_or_else(Dict::new);
    args.remove("id");
    convert_result(db.invoke_action(&id, action, &args))
}
