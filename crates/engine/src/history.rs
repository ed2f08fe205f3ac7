//! History access
//!
//! A [`HistoryStore`] backend returns raw samples; [`History`] resolves the
//! entity, then normalises what the backend returns: samples are sorted by
//! timestamp and only those in `(start, end]` are kept. Backends may be
//! sloppy about ordering and boundaries, callers never see it.
//!
//! The synthetic backend refuses ranges spanning more than
//! [`MAX_SYNTHETIC_SAMPLES`] intervals with `MalformedRequest`.

use chrono::Duration;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use tracing::debug;

use haystack_core::{
    DateTimeRange, Entity, EntityId, Error, HistoryItem, Result, TimeZone, Value, ZonedDateTime,
};
use haystack_storage::EntityStore;

use crate::access::EntityAccess;

/// Time-series backend
pub trait HistoryStore: Send + Sync {
    /// Samples of `entity` covering `range`
    fn on_his_read(&self, entity: &Entity, range: &DateTimeRange) -> Result<Vec<HistoryItem>>;

    /// Merge `items` into the series of `entity`
    ///
    /// # Errors
    /// Returns `UnsupportedWrite` if the backend is read-only. A failed
    /// write must leave the series unchanged.
    fn on_his_write(&self, entity: &Entity, items: &[HistoryItem]) -> Result<()>;
}

/// Most samples one synthetic read may generate
pub const MAX_SYNTHETIC_SAMPLES: i64 = 1_000_000;

/// Read-only backend generating one sample per interval
///
/// `kind == "Bool"` points alternate true/false, everything else counts
/// 0, 1, 2, ...
#[derive(Debug, Clone)]
pub struct SyntheticHistory {
    interval: Duration,
}

impl SyntheticHistory {
    /// Generator with the given sample spacing
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Sample spacing
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for SyntheticHistory {
    fn default() -> Self {
        Self::new(Duration::minutes(15))
    }
}

impl HistoryStore for SyntheticHistory {
    fn on_his_read(&self, entity: &Entity, range: &DateTimeRange) -> Result<Vec<HistoryItem>> {
        let step = self.interval.num_milliseconds();
        if step <= 0 {
            return Err(Error::malformed("History interval must be positive"));
        }
        let is_bool = entity.get_str("kind") == Some("Bool");
        let tz = TimeZone::make(&range.start.tz)?;
        let end = range.end.millis();
        let count = (end - range.start.millis()) / step;
        if count > MAX_SYNTHETIC_SAMPLES {
            return Err(Error::malformed(format!(
                "Range covers {} samples, limit is {}",
                count, MAX_SYNTHETIC_SAMPLES
            )));
        }
        let mut items = Vec::with_capacity(count.max(0) as usize);
        let mut ts = range.start.millis() + step;
        while ts <= end {
            let val = if is_bool {
                Value::Bool(items.len() % 2 == 0)
            } else {
                Value::number(items.len() as f64)
            };
            let stamp = ZonedDateTime::from_millis(ts, &tz)
                .ok_or_else(|| Error::malformed(format!("Timestamp out of range: {}", ts)))?;
            items.push(HistoryItem::new(stamp, val));
            ts += step;
        }
        Ok(items)
    }

    fn on_his_write(&self, entity: &Entity, _items: &[HistoryItem]) -> Result<()> {
        Err(Error::UnsupportedWrite(format!(
            "History of {} is generated and read-only",
            entity.dis()
        )))
    }
}

/// Writable in-memory backend, one series per entity
#[derive(Debug, Default)]
pub struct MemoryHistory {
    series: DashMap<EntityId, BTreeMap<i64, HistoryItem>>,
}

impl MemoryHistory {
    /// Empty historian
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of samples stored for `id`
    pub fn len(&self, id: &EntityId) -> usize {
        self.series.get(id).map_or(0, |s| s.len())
    }
}

impl HistoryStore for MemoryHistory {
    fn on_his_read(&self, entity: &Entity, range: &DateTimeRange) -> Result<Vec<HistoryItem>> {
        let Some(id) = entity.id() else {
            return Ok(Vec::new());
        };
        let Some(series) = self.series.get(id) else {
            return Ok(Vec::new());
        };
        let bounds = (
            Bound::Excluded(range.start.millis()),
            Bound::Included(range.end.millis()),
        );
        Ok(series
            .range(bounds)
            .map(|(_, item)| item.clone())
            .collect())
    }

    fn on_his_write(&self, entity: &Entity, items: &[HistoryItem]) -> Result<()> {
        let id = entity
            .id()
            .ok_or_else(|| Error::malformed("Entity missing Ref 'id' tag"))?;
        let mut series = self.series.entry(id.clone()).or_default();
        for item in items {
            series.insert(item.ts.millis(), item.clone());
        }
        Ok(())
    }
}

/// History reads and writes over an entity store and a backend
pub struct History {
    entities: Arc<dyn EntityStore>,
    backend: Arc<dyn HistoryStore>,
}

impl History {
    /// Combine an entity store with a backend
    pub fn new(entities: Arc<dyn EntityStore>, backend: Arc<dyn HistoryStore>) -> Self {
        Self { entities, backend }
    }

    /// Samples of `id` in `(start, end]`, ascending
    ///
    /// # Errors
    /// Returns `UnknownEntity` if `id` does not resolve.
    pub fn his_read(&self, id: &EntityId, range: &DateTimeRange) -> Result<Vec<HistoryItem>> {
        let entity = self.resolve(id)?;
        let mut items: Vec<HistoryItem> = self
            .backend
            .on_his_read(&entity, range)?
            .into_iter()
            .filter(|item| range.contains(&item.ts))
            .collect();
        items.sort_by(|a, b| a.ts.cmp(&b.ts));
        debug!(id = %id, samples = items.len(), "hisRead");
        Ok(items)
    }

    /// Merge samples into the series of `id`
    ///
    /// # Errors
    /// Returns `UnknownEntity` if `id` does not resolve, or whatever the
    /// backend reports (`UnsupportedWrite` for read-only backends).
    pub fn his_write(&self, id: &EntityId, items: &[HistoryItem]) -> Result<()> {
        let entity = self.resolve(id)?;
        self.backend.on_his_write(&entity, items)?;
        debug!(id = %id, samples = items.len(), "hisWrite");
        Ok(())
    }

    fn resolve(&self, id: &EntityId) -> Result<Arc<Entity>> {
        self.entities
            .read_by_id(id, true)?
            .ok_or_else(|| Error::unknown_entity(id.to_code()))
    }
}

impl std::fmt::Debug for History {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("History").finish_non_exhaustive()
    }
}
