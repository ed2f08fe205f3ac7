//! Entity store hooks
//!
//! A backend supplies exactly two hooks: point lookup and full iteration.
//! Batch reads and filter queries have default implementations in terms of
//! those hooks; a backend with an index can override them.
//!
//! The hooks never fail on a missing entity. They return `None` (or a null
//! row) and leave the checked/unchecked decision to the caller.

use std::sync::Arc;

use haystack_core::{Entity, EntityId, Result, Table};

use crate::filter::Filter;

/// Read-only access to a tagged-entity database
pub trait EntityStore: Send + Sync {
    /// Entity with `id`, or `None`
    fn on_read_by_id(&self, id: &EntityId) -> Option<Arc<Entity>>;

    /// Every entity, in a stable order
    fn entities(&self) -> Vec<Arc<Entity>>;

    /// One row per requested id, in request order; unknown ids give an
    /// all-null row
    fn on_read_by_ids(&self, ids: &[EntityId]) -> Table {
        let found: Vec<Option<Arc<Entity>>> = ids.iter().map(|id| self.on_read_by_id(id)).collect();
        Table::from_optional_dicts(found.iter().map(|e| e.as_deref()))
    }

    /// Entities matching `filter`, at most `limit` of them
    ///
    /// # Errors
    /// Returns `MalformedRequest` if the filter does not parse.
    fn on_read_all(&self, filter: &str, limit: usize) -> Result<Table> {
        let filter = Filter::parse(filter)?;
        let resolve = |id: &EntityId| self.on_read_by_id(id);
        let matched: Vec<Arc<Entity>> = self
            .entities()
            .into_iter()
            .filter(|e| filter.matches(e, &resolve))
            .take(limit)
            .collect();
        Ok(Table::from_dicts(&matched))
    }
}

impl<S: EntityStore + ?Sized> EntityStore for Arc<S> {
    fn on_read_by_id(&self, id: &EntityId) -> Option<Arc<Entity>> {
        (**self).on_read_by_id(id)
    }

    fn entities(&self) -> Vec<Arc<Entity>> {
        (**self).entities()
    }

    fn on_read_by_ids(&self, ids: &[EntityId]) -> Table {
        (**self).on_read_by_ids(ids)
    }

    fn on_read_all(&self, filter: &str, limit: usize) -> Result<Table> {
        (**self).on_read_all(filter, limit)
    }
}
