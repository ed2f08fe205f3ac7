//! Watch subscriptions
//!
//! A watch is a server-side subscription to a set of entities. Clients poll
//! it for entities whose value changed since the previous poll ("cov"), or
//! for a full refresh.
//!
//! ## Lifecycle
//!
//! ```text
//! open ──► sub/unsub/poll ...  ──► close
//!                 │
//!                 └─ lease elapses without renewal ──► expired
//! ```
//!
//! Every successful sub, unsub or poll renews the lease. A lease too long
//! to represent as a deadline never expires. Expired watches are
//! removed lazily when touched; [`WatchManager::sweep_expired`] removes them
//! eagerly. A closed or expired watch behaves exactly like one that never
//! existed: handles fail with `UnknownWatch`.
//!
//! ## Concurrency
//!
//! Watches live in a DashMap keyed by watch id. Each watch's subscription
//! state sits behind its own mutex, so operations on one watch serialize and
//! different watches never contend.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use uuid::Uuid;

use haystack_core::{Dict, Entity, EntityId, Error, Number, Result, Table};
use haystack_storage::EntityStore;

/// Mutable part of a watch
#[derive(Debug)]
struct WatchState {
    lease: Duration,
    /// `None` when `now + lease` overflows
    expires_at: Option<Instant>,
    closed: bool,
    /// Subscribed ids in subscription order
    ids: Vec<EntityId>,
    /// Value each subscribed entity had at the last sub or poll
    last_seen: HashMap<EntityId, Option<Arc<Entity>>>,
}

impl WatchState {
    fn is_live(&self, now: Instant) -> bool {
        !self.closed && self.expires_at.map_or(true, |at| now < at)
    }

    fn renew(&mut self, now: Instant) {
        self.expires_at = now.checked_add(self.lease);
    }
}

#[derive(Debug)]
struct WatchEntry {
    id: String,
    dis: Option<String>,
    state: Mutex<WatchState>,
}

struct Shared {
    entities: Arc<dyn EntityStore>,
    watches: DashMap<String, Arc<WatchEntry>>,
}

impl Shared {
    fn remove(&self, id: &str) {
        if self.watches.remove(id).is_some() {
            debug!(watch = id, "Watch removed");
        }
    }
}

/// Handle to an open watch
///
/// Handles are cheap to clone and all clones refer to the same watch.
#[derive(Clone)]
pub struct Watch {
    entry: Arc<WatchEntry>,
    shared: Arc<Shared>,
}

impl Watch {
    /// Server-assigned id
    pub fn id(&self) -> &str {
        &self.entry.id
    }

    /// Display name given at open
    pub fn dis(&self) -> Option<&str> {
        self.entry.dis.as_deref()
    }

    /// Current lease
    pub fn lease(&self) -> Duration {
        self.entry.state.lock().lease
    }

    /// Change the lease; takes effect from now
    ///
    /// # Errors
    /// Returns `UnknownWatch` if the watch is closed or expired.
    pub fn set_lease(&self, lease: Duration) -> Result<()> {
        self.with_live(|state, now| {
            state.lease = lease;
            state.renew(now);
            Ok(())
        })
    }

    /// Whether the watch is neither closed nor expired
    pub fn is_open(&self) -> bool {
        self.entry.state.lock().is_live(Instant::now())
    }

    /// Subscribed ids in subscription order
    pub fn ids(&self) -> Vec<EntityId> {
        self.entry.state.lock().ids.clone()
    }

    /// Add ids and return their current values
    ///
    /// The table has one row per requested id in request order, all-null
    /// for ids that do not resolve. Meta carries `watchId` and `lease`.
    ///
    /// # Errors
    /// Returns `UnknownWatch` if the watch is closed or expired.
    pub fn sub(&self, ids: &[EntityId]) -> Result<Table> {
        self.with_live(|state, now| {
            let found: Vec<Option<Arc<Entity>>> = ids
                .iter()
                .map(|id| self.shared.entities.on_read_by_id(id))
                .collect();
            for (id, entity) in ids.iter().zip(&found) {
                if !state.last_seen.contains_key(id) {
                    state.ids.push(id.clone());
                }
                state.last_seen.insert(id.clone(), entity.clone());
            }
            state.renew(now);
            debug!(watch = %self.entry.id, count = ids.len(), "Watch sub");
            let table = Table::from_optional_dicts(found.iter().map(|e| e.as_deref()));
            Ok(table.with_meta(self.meta(state.lease)))
        })
    }

    /// Remove ids; ids never subscribed are ignored
    ///
    /// # Errors
    /// Returns `UnknownWatch` if the watch is closed or expired.
    pub fn unsub(&self, ids: &[EntityId]) -> Result<()> {
        self.with_live(|state, now| {
            for id in ids {
                if state.last_seen.remove(id).is_some() {
                    state.ids.retain(|s| s != id);
                }
            }
            state.renew(now);
            debug!(watch = %self.entry.id, count = ids.len(), "Watch unsub");
            Ok(())
        })
    }

    /// Entities whose value changed since the last sub or poll
    ///
    /// An entity that vanished counts as changed but produces no row.
    ///
    /// # Errors
    /// Returns `UnknownWatch` if the watch is closed or expired.
    pub fn poll_changes(&self) -> Result<Table> {
        self.with_live(|state, now| {
            let mut changed = Vec::new();
            let WatchState { ids, last_seen, .. } = &mut *state;
            for id in ids.iter() {
                let current = self.shared.entities.on_read_by_id(id);
                let previous = last_seen.get(id).cloned().flatten();
                let differs = match (&previous, &current) {
                    (Some(a), Some(b)) => a != b,
                    (None, None) => false,
                    _ => true,
                };
                if differs {
                    if let Some(entity) = &current {
                        changed.push(Arc::clone(entity));
                    }
                    last_seen.insert(id.clone(), current);
                }
            }
            state.renew(now);
            debug!(watch = %self.entry.id, changed = changed.len(), "Watch poll");
            Ok(Table::from_dicts(&changed).with_meta(self.meta(state.lease)))
        })
    }

    /// Every resolvable subscribed entity; resets the change baseline
    ///
    /// # Errors
    /// Returns `UnknownWatch` if the watch is closed or expired.
    pub fn poll_refresh(&self) -> Result<Table> {
        self.with_live(|state, now| {
            let mut all = Vec::new();
            let WatchState { ids, last_seen, .. } = &mut *state;
            for id in ids.iter() {
                let current = self.shared.entities.on_read_by_id(id);
                if let Some(entity) = &current {
                    all.push(Arc::clone(entity));
                }
                last_seen.insert(id.clone(), current);
            }
            state.renew(now);
            debug!(watch = %self.entry.id, rows = all.len(), "Watch refresh");
            Ok(Table::from_dicts(&all).with_meta(self.meta(state.lease)))
        })
    }

    /// Close the watch; closing twice is a no-op
    pub fn close(&self) {
        let was_open = {
            let mut state = self.entry.state.lock();
            let was_open = !state.closed;
            state.closed = true;
            state.ids.clear();
            state.last_seen.clear();
            was_open
        };
        self.shared.remove(&self.entry.id);
        if was_open {
            info!(watch = %self.entry.id, "Watch closed");
        }
    }

    fn meta(&self, lease: Duration) -> Dict {
        Dict::new()
            .with("watchId", self.entry.id.as_str())
            .with("lease", Number::with_unit(lease.as_secs_f64(), "s"))
    }

    /// Run `f` on live state; a dead watch is dropped from the table
    fn with_live<T>(&self, f: impl FnOnce(&mut WatchState, Instant) -> Result<T>) -> Result<T> {
        let now = Instant::now();
        let mut state = self.entry.state.lock();
        if !state.is_live(now) {
            drop(state);
            self.shared.remove(&self.entry.id);
            return Err(Error::UnknownWatch(self.entry.id.clone()));
        }
        f(&mut *state, now)
    }
}

impl std::fmt::Debug for Watch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watch")
            .field("id", &self.entry.id)
            .field("dis", &self.entry.dis)
            .finish()
    }
}

/// Table of open watches
pub struct WatchManager {
    shared: Arc<Shared>,
    default_lease: Duration,
}

impl WatchManager {
    /// Manager reading entities from `entities`
    pub fn new(entities: Arc<dyn EntityStore>, default_lease: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                entities,
                watches: DashMap::new(),
            }),
            default_lease,
        }
    }

    /// Lease given to watches opened without one
    pub fn default_lease(&self) -> Duration {
        self.default_lease
    }

    /// Open a watch with a fresh id and no subscriptions
    pub fn open(&self, dis: Option<String>, lease: Option<Duration>) -> Watch {
        let lease = lease.unwrap_or(self.default_lease);
        let id = Uuid::new_v4().to_string();
        let entry = Arc::new(WatchEntry {
            id: id.clone(),
            dis,
            state: Mutex::new(WatchState {
                lease,
                expires_at: Instant::now().checked_add(lease),
                closed: false,
                ids: Vec::new(),
                last_seen: HashMap::new(),
            }),
        });
        self.shared.watches.insert(id.clone(), Arc::clone(&entry));
        info!(watch = %id, dis = ?entry.dis, lease_secs = lease.as_secs(), "Watch opened");
        Watch {
            entry,
            shared: Arc::clone(&self.shared),
        }
    }

    /// Watch by id
    ///
    /// # Errors
    /// Returns `UnknownWatch` if `checked` and the watch does not exist,
    /// was closed, or has expired.
    pub fn lookup(&self, id: &str, checked: bool) -> Result<Option<Watch>> {
        let entry = self.shared.watches.get(id).map(|e| Arc::clone(e.value()));
        let live = entry.filter(|e| {
            let live = e.state.lock().is_live(Instant::now());
            if !live {
                self.shared.remove(id);
            }
            live
        });
        match live {
            Some(entry) => Ok(Some(Watch {
                entry,
                shared: Arc::clone(&self.shared),
            })),
            None if checked => Err(Error::UnknownWatch(id.to_string())),
            None => Ok(None),
        }
    }

    /// Open watches, ordered by id
    pub fn watches(&self) -> Vec<Watch> {
        let now = Instant::now();
        let mut open: Vec<Watch> = self
            .shared
            .watches
            .iter()
            .filter(|e| e.value().state.lock().is_live(now))
            .map(|e| Watch {
                entry: Arc::clone(e.value()),
                shared: Arc::clone(&self.shared),
            })
            .collect();
        open.sort_by(|a, b| a.id().cmp(b.id()));
        open
    }

    /// Remove every expired watch; returns how many were removed
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.shared.watches.len();
        self.shared.watches.retain(|_, e| e.state.lock().is_live(now));
        let removed = before.saturating_sub(self.shared.watches.len());
        if removed > 0 {
            info!(removed, "Swept expired watches");
        }
        removed
    }

    /// Number of watches in the table, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.shared.watches.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.shared.watches.is_empty()
    }
}

impl std::fmt::Debug for WatchManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchManager")
            .field("watches", &self.shared.watches.len())
            .field("default_lease", &self.default_lease)
            .finish()
    }
}
