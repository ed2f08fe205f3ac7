//! Timezones and zoned timestamps
//!
//! Haystack names timezones by the city part of the Olson id (`New_York`,
//! `London`, ...) plus `UTC`/`GMT` and the `Etc/GMT+N` forms as `GMT+N`.
//! The registry is built once from the IANA database shipped with
//! `chrono-tz`, restricted to the continental regions and `Etc`. Offsets
//! are resolved per instant, so daylight saving is honoured.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone as _, Utc};
use chrono_tz::{Tz, TZ_VARIANTS};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

/// Olson regions whose zones get a Haystack name
const REGIONS: &[&str] = &[
    "Africa",
    "America",
    "Antarctica",
    "Asia",
    "Atlantic",
    "Australia",
    "Etc",
    "Europe",
    "Indian",
    "Pacific",
];

/// Haystack name -> IANA zone
static REGISTRY: Lazy<HashMap<&'static str, Tz>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for tz in TZ_VARIANTS.iter().copied() {
        let olson = tz.name();
        let Some((region, _)) = olson.split_once('/') else {
            continue;
        };
        if !REGIONS.contains(&region) {
            continue;
        }
        if let Some((_, city)) = olson.rsplit_once('/') {
            map.insert(city, tz);
        }
    }
    map
});

/// A named timezone backed by an IANA zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeZone {
    name: String,
    tz: Tz,
}

impl TimeZone {
    /// The UTC timezone
    pub fn utc() -> Self {
        Self {
            name: "UTC".to_string(),
            tz: chrono_tz::Etc::UTC,
        }
    }

    /// Look up a timezone by Haystack name, `None` if unknown
    ///
    /// `GMT+N` follows the Olson `Etc/GMT+N` convention: it is N hours
    /// *behind* UTC.
    pub fn find(name: &str) -> Option<Self> {
        REGISTRY.get(name).map(|tz| Self {
            name: name.to_string(),
            tz: *tz,
        })
    }

    /// Look up a timezone by Haystack name
    ///
    /// # Errors
    /// Returns `MalformedRequest` if the name is not registered.
    pub fn make(name: &str) -> Result<Self> {
        Self::find(name).ok_or_else(|| Error::malformed(format!("Unknown tz: {}", name)))
    }

    /// Haystack timezone name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Underlying IANA zone
    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// UTC offset in effect at `instant`
    pub fn offset_at(&self, instant: &DateTime<Utc>) -> FixedOffset {
        self.tz.offset_from_utc_datetime(&instant.naive_utc()).fix()
    }
}

impl Default for TimeZone {
    fn default() -> Self {
        Self::utc()
    }
}

impl fmt::Display for TimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A timestamp carrying its Haystack timezone name
///
/// Equality and ordering compare the instant only; two values naming
/// different zones for the same instant are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZonedDateTime {
    /// Instant with the zone's offset applied
    pub ts: DateTime<FixedOffset>,
    /// Haystack timezone name
    pub tz: String,
}

impl ZonedDateTime {
    /// Convert a UTC instant into `tz`
    pub fn new(instant: DateTime<Utc>, tz: &TimeZone) -> Self {
        Self {
            ts: instant.with_timezone(&tz.offset_at(&instant)),
            tz: tz.name().to_string(),
        }
    }

    /// Wall-clock time `local` in `tz`
    ///
    /// An ambiguous time (clocks turned back) resolves to the earlier
    /// instant. A time skipped by a forward transition resolves to the
    /// first valid instant after the gap.
    pub fn from_local(local: &NaiveDateTime, tz: &TimeZone) -> Option<Self> {
        let resolved = tz.tz.from_local_datetime(local).earliest().or_else(|| {
            (1..=4)
                .map(|h| *local + chrono::Duration::minutes(30 * h))
                .find_map(|later| tz.tz.from_local_datetime(&later).earliest())
        })?;
        Some(Self::new(resolved.with_timezone(&Utc), tz))
    }

    /// Current time in `tz`
    pub fn now(tz: &TimeZone) -> Self {
        Self::new(Utc::now(), tz)
    }

    /// From milliseconds since the Unix epoch
    pub fn from_millis(millis: i64, tz: &TimeZone) -> Option<Self> {
        let instant = Utc.timestamp_millis_opt(millis).single()?;
        Some(Self::new(instant, tz))
    }

    /// Milliseconds since the Unix epoch
    pub fn millis(&self) -> i64 {
        self.ts.timestamp_millis()
    }

    /// Parse `<rfc3339> [tzName]`
    ///
    /// Without a timezone name the value is normalised to UTC.
    ///
    /// # Errors
    /// Returns `MalformedRequest` on a bad timestamp or unknown zone.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (stamp, tz_name) = match s.split_once(' ') {
            Some((stamp, tz)) => (stamp, Some(tz.trim())),
            None => (s, None),
        };
        let parsed = DateTime::parse_from_rfc3339(stamp)
            .map_err(|e| Error::malformed(format!("Invalid datetime '{}': {}", stamp, e)))?;
        let tz = match tz_name {
            Some(name) => TimeZone::make(name)?,
            None => TimeZone::utc(),
        };
        Ok(Self::new(parsed.with_timezone(&Utc), &tz))
    }
}

impl PartialEq for ZonedDateTime {
    fn eq(&self, other: &Self) -> bool {
        self.ts == other.ts
    }
}

impl Eq for ZonedDateTime {}

impl PartialOrd for ZonedDateTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ZonedDateTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ts.cmp(&other.ts)
    }
}

impl fmt::Display for ZonedDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ts.to_rfc3339(), self.tz)
    }
}
