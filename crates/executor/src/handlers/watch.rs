//! Watch handlers.

use std::time::Duration;

use haystack_core::{Number, Table};
use haystack_engine::Database;

use crate::convert::convert_result;
use crate::request::{ids, meta_str};
use crate::{Error, Result};

/// Handle `watchSub`.
///
/// Meta `watchId` subscribes on an existing watch; otherwise a watch is
/// opened with meta `watchDis`. An optional meta `lease` sets the lease.
pub fn watch_sub(db: &Database, req: &Table) -> Result<Table> {
    let lease = match req.meta().get("lease") {
        Some(val) => Some(to_lease(val.as_number())?),
        None => None,
    };
    let ids = ids(req)?;
    let watch = if req.meta().has("watchId") {
        let watch_id = meta_str(req, "watchId")?;
        let watch = convert_result(db.watches().lookup(watch_id, true))?.ok_or_else(|| {
            Error::UnknownWatch {
                watch: watch_id.to_string(),
            }
        })?;
        if let Some(lease) = lease {
            convert_result(watch.set_lease(lease))?;
        }
        watch
    } else {
        let dis = meta_str(req, "watchDis")?;
        db.watches().open(Some(dis.to_string()), lease)
    };
    convert_result(watch.sub(&ids))
}

/// Handle `watchUnsub`.
///
/// Unknown watches are ignored. Meta `close` closes the watch, otherwise
/// the `id` rows are unsubscribed.
pub fn watch_unsub(db: &Database, req: &Table) -> Result<Table> {
    let watch_id = meta_str(req, "watchId")?;
    let close = req.meta().has("close");
    let ids = if close { Vec::new() } else { ids(req)? };
    if let Some(watch) = convert_result(db.watches().lookup(watch_id, false))? {
        if close {
            watch.close();
        } else {
            convert_result(watch.unsub(&ids))?;
        }
    }
    Ok(Table::empty())
}

/// Handle `watchPoll`.
///
/// Meta `refresh` returns every subscribed entity, otherwise only changes.
pub fn watch_poll(db: &Database, req: &Table) -> Result<Table> {
    let watch_id = meta_str(req, "watchId")?;
    let watch = convert_result(db.watches().lookup(watch_id, true))?.ok_or_else(|| {
        Error::UnknownWatch {
            watch: watch_id.to_string(),
        }
    })?;
    if req.meta().has("refresh") {
        convert_result(watch.poll_refresh())
    } else {
        convert_result(watch.poll_changes())
    }
}

/// Lease from a Number; unitless means seconds
fn to_lease(num: Option<&Number>) -> Result<Duration> {
    let num = num.ok_or_else(|| Error::malformed("'lease' must be a Number"))?;
    let secs = match num.unit.as_deref() {
        None | Some("s") | Some("sec") => num.val,
        Some("ms") => num.val / 1000.0,
        Some("min") => num.val * 60.0,
        Some("h") | Some("hr") => num.val * 3600.0,
        Some(other) => {
            return Err(Error::malformed(format!("Unsupported lease unit '{}'", other)))
        }
    };
    if !secs.is_finite() || secs <= 0.0 {
        return Err(Error::malformed("'lease' must be positive"));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|_| Error::malformed(format!("'lease' out of range: {}", num)))
}
