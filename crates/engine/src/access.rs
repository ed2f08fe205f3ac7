//! Entity access with checked/unchecked resolution
//!
//! `EntityAccess` is blanket-implemented for every [`EntityStore`], so the
//! checked policy is the same for all backends and cannot be overridden.
//!
//! - Unchecked reads never fail on a miss: single reads give `None`, batch
//!   reads give an all-null row in the miss position.
//! - Checked reads fail with `UnknownEntity` naming the first id (or the
//!   filter) that did not resolve.
//!
//! A filter that does not parse is `MalformedRequest` in both modes.

use std::sync::Arc;

use haystack_core::{Entity, EntityId, Error, Result, Table};
use haystack_storage::EntityStore;

/// Checked/unchecked reads over an [`EntityStore`]
pub trait EntityAccess: EntityStore {
    /// Entity with `id`
    ///
    /// # Errors
    /// Returns `UnknownEntity` if `checked` and the id does not resolve.
    fn read_by_id(&self, id: &EntityId, checked: bool) -> Result<Option<Arc<Entity>>> {
        match self.on_read_by_id(id) {
            Some(entity) => Ok(Some(entity)),
            None if checked => Err(Error::unknown_entity(id.to_code())),
            None => Ok(None),
        }
    }

    /// One row per id, positionally aligned with `ids`
    ///
    /// # Errors
    /// Returns `UnknownEntity` naming the first unresolved id if `checked`.
    fn read_by_ids(&self, ids: &[EntityId], checked: bool) -> Result<Table> {
        let table = self.on_read_by_ids(ids);
        if checked {
            if let Some(pos) = table.rows().position(|row| row.missing("id")) {
                return Err(Error::unknown_entity(ids[pos].to_code()));
            }
        }
        Ok(table)
    }

    /// First entity matching `filter`
    ///
    /// Which entity is returned when several match is unspecified.
    ///
    /// # Errors
    /// Returns `UnknownEntity` if `checked` and nothing matches, or
    /// `MalformedRequest` if the filter does not parse.
    fn read(&self, filter: &str, checked: bool) -> Result<Option<Entity>> {
        let table = self.read_all(filter, Some(1))?;
        match table.row(0) {
            Some(row) => Ok(Some(row.to_dict())),
            None if checked => Err(Error::unknown_entity(filter)),
            None => Ok(None),
        }
    }

    /// Entities matching `filter`, at most `limit` (unbounded for `None`)
    fn read_all(&self, filter: &str, limit: Option<usize>) -> Result<Table> {
        self.on_read_all(filter, limit.unwrap_or(usize::MAX))
    }
}

impl<S: EntityStore + ?Sized> EntityAccess for S {}
