//! Time-series samples and query ranges
//!
//! ## Range convention
//!
//! A [`DateTimeRange`] is **start-exclusive, end-inclusive**: a sample at
//! exactly `start` belongs to the previous range. Two adjacent ranges
//! (`a..b`, `b..c`) therefore never report the same boundary sample.
//!
//! ## Range expressions
//!
//! | Expression | Meaning |
//! |------------|---------|
//! | `today` / `yesterday` | that calendar day in the given timezone |
//! | `2024-03-01` | that day |
//! | `2024-03-01,2024-03-04` | midnight of the first day to midnight after the last |
//! | `<datetime>,<datetime>` | exact instants (RFC 3339, optional tz name) |
//! | `<datetime>` | that instant until now |

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::table::Table;
use crate::time::{TimeZone, ZonedDateTime};
use crate::value::Value;

/// One timestamped sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    /// Sample time
    pub ts: ZonedDateTime,
    /// Sample value
    pub val: Value,
}

impl HistoryItem {
    /// Create a sample
    pub fn new(ts: ZonedDateTime, val: impl Into<Value>) -> Self {
        Self {
            ts,
            val: val.into(),
        }
    }

    /// Read `ts, val` rows of a hisWrite request
    ///
    /// # Errors
    /// Returns `MalformedRequest` when a row lacks a DateTime `ts` or a `val`.
    pub fn from_table(table: &Table) -> Result<Vec<Self>> {
        table
            .rows()
            .enumerate()
            .map(|(i, row)| {
                let ts = row
                    .get("ts")
                    .and_then(Value::as_datetime)
                    .ok_or_else(|| Error::malformed(format!("Row {} missing DateTime 'ts'", i)))?;
                let val = row
                    .get("val")
                    .ok_or_else(|| Error::malformed(format!("Row {} missing 'val'", i)))?;
                Ok(HistoryItem::new(ts.clone(), val.clone()))
            })
            .collect()
    }
}

/// Time range of a history query, start-exclusive and end-inclusive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateTimeRange {
    /// Exclusive lower bound
    pub start: ZonedDateTime,
    /// Inclusive upper bound
    pub end: ZonedDateTime,
}

impl DateTimeRange {
    /// Create a range
    ///
    /// # Errors
    /// Returns `MalformedRequest` if `end` is before `start`.
    pub fn new(start: ZonedDateTime, end: ZonedDateTime) -> Result<Self> {
        if end < start {
            return Err(Error::malformed(format!(
                "Range end {} is before start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// Midnight starting `first` to midnight ending `last`, in `tz`
    pub fn for_dates(first: NaiveDate, last: NaiveDate, tz: &TimeZone) -> Result<Self> {
        let after_last = last
            .checked_add_days(Days::new(1))
            .ok_or_else(|| Error::malformed(format!("Date out of range: {}", last)))?;
        Self::new(midnight(first, tz)?, midnight(after_last, tz)?)
    }

    /// Whether `ts` falls in `(start, end]`
    pub fn contains(&self, ts: &ZonedDateTime) -> bool {
        *ts > self.start && *ts <= self.end
    }

    /// Parse a range expression relative to the current time
    pub fn parse(expr: &str, tz: &TimeZone) -> Result<Self> {
        Self::parse_at(expr, tz, Utc::now())
    }

    /// Parse a range expression relative to `now`
    ///
    /// # Errors
    /// Returns `MalformedRequest` for anything not listed in the module docs.
    pub fn parse_at(expr: &str, tz: &TimeZone, now: DateTime<Utc>) -> Result<Self> {
        let expr = expr.trim();
        let today = now.with_timezone(&tz.tz()).date_naive();
        match expr {
            "today" => return Self::for_dates(today, today, tz),
            "yesterday" => {
                let yesterday = today
                    .pred_opt()
                    .ok_or_else(|| Error::malformed("Date out of range"))?;
                return Self::for_dates(yesterday, yesterday, tz);
            }
            _ => {}
        }

        if let Some((a, b)) = expr.split_once(',') {
            let (a, b) = (a.trim(), b.trim());
            return match (parse_date(a), parse_date(b)) {
                (Some(first), Some(last)) => Self::for_dates(first, last, tz),
                (Some(first), None) => Self::new(midnight(first, tz)?, ZonedDateTime::parse(b)?),
                (None, Some(last)) => {
                    let after_last = last
                        .succ_opt()
                        .ok_or_else(|| Error::malformed("Date out of range"))?;
                    Self::new(ZonedDateTime::parse(a)?, midnight(after_last, tz)?)
                }
                (None, None) => Self::new(ZonedDateTime::parse(a)?, ZonedDateTime::parse(b)?),
            };
        }

        if let Some(day) = parse_date(expr) {
            return Self::for_dates(day, day, tz);
        }

        let start = ZonedDateTime::parse(expr)
            .map_err(|_| Error::malformed(format!("Invalid range: '{}'", expr)))?;
        let end = ZonedDateTime::new(now, &TimeZone::make(&start.tz)?);
        Self::new(start, end)
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn midnight(day: NaiveDate, tz: &TimeZone) -> Result<ZonedDateTime> {
    let local = day
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| Error::malformed(format!("Invalid date: {}", day)))?;
    ZonedDateTime::from_local(&local, tz)
        .ok_or_else(|| Error::malformed(format!("Invalid local time: {}", local)))
}
