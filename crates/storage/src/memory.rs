//! In-memory entity store
//!
//! Entities live in a DashMap keyed by id, each behind an `Arc` so readers
//! share records without copying. Seed data is a JSON table whose rows are
//! entity dicts; rows without a Ref `id` tag are skipped with a warning.

use dashmap::DashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use haystack_core::{Entity, EntityId, Error, Result, Table};

use crate::store::EntityStore;

/// DashMap-backed entity store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entities: DashMap<EntityId, Arc<Entity>>,
}

impl MemoryStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entity, returning the previous record
    ///
    /// # Errors
    /// Returns `MalformedRequest` if the entity has no Ref `id` tag.
    pub fn put(&self, entity: Entity) -> Result<Option<Arc<Entity>>> {
        let id = entity
            .id()
            .cloned()
            .ok_or_else(|| Error::malformed("Entity missing Ref 'id' tag"))?;
        Ok(self.entities.insert(id, Arc::new(entity)))
    }

    /// Remove an entity
    pub fn remove(&self, id: &EntityId) -> Option<Arc<Entity>> {
        self.entities.remove(id).map(|(_, e)| e)
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Insert every row of `table` that carries an id; returns rows loaded
    pub fn load_table(&self, table: &Table) -> usize {
        let mut loaded = 0;
        for (i, row) in table.rows().enumerate() {
            if row.id().is_none() {
                warn!(row = i, "Skipping seed row without id");
                continue;
            }
            // id presence checked above
            if self.put(row.to_dict()).is_ok() {
                loaded += 1;
            }
        }
        loaded
    }

    /// Load a JSON table file
    ///
    /// A missing file is not an error: the store stays empty and a warning
    /// is logged.
    ///
    /// # Errors
    /// Returns `IoError` if the file exists but cannot be read, or
    /// `SerializationError` if it is not a table.
    pub fn load_file(&self, path: &Path) -> Result<usize> {
        if !path.exists() {
            warn!(path = %path.display(), "Seed file not found");
            return Ok(0);
        }
        let text = std::fs::read_to_string(path)?;
        let table: Table = serde_json::from_str(&text)?;
        let loaded = self.load_table(&table);
        info!(path = %path.display(), rows = loaded, "Loaded {} rows", loaded);
        Ok(loaded)
    }

    /// Store seeded from `path`
    pub fn from_file(path: &Path) -> Result<Self> {
        let store = Self::new();
        store.load_file(path)?;
        Ok(store)
    }
}

impl EntityStore for MemoryStore {
    fn on_read_by_id(&self, id: &EntityId) -> Option<Arc<Entity>> {
        self.entities.get(id).map(|e| Arc::clone(e.value()))
    }

    fn entities(&self) -> Vec<Arc<Entity>> {
        let mut all: Vec<(EntityId, Arc<Entity>)> = self
            .entities
            .iter()
            .map(|e| (e.key().clone(), Arc::clone(e.value())))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all.into_iter().map(|(_, e)| e).collect()
    }
}
