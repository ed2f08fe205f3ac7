//! Priority write register
//!
//! Every writable point has an array of 17 leveled slots. Level 1 is the
//! highest priority, level 17 the lowest. A slot holds an optional value and
//! the name of whoever wrote it; writing `None` relinquishes the level.
//!
//! # Concurrency
//!
//! Arrays live in a DashMap keyed by entity id, each behind its own
//! `parking_lot::Mutex`. Writes to different points never contend, and a
//! snapshot is copied out under the lock so readers never see a torn array.
//! There are no cross-point transactions.
//!
//! # Arbitration
//!
//! The register only records writes. Deciding the effective output value is
//! left to an [`ArbitrationPolicy`] chosen by the caller.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

use haystack_core::{EntityId, Error, Number, Result, Table, TableBuilder, Value};

/// Number of priority levels
pub const LEVELS: usize = 17;

/// One level of a write array
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteSlot {
    /// Written value, `None` when relinquished
    pub val: Option<Value>,
    /// Who wrote the value
    pub who: Option<String>,
}

/// The 17 slots of one point
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteArray {
    slots: [WriteSlot; LEVELS],
}

impl WriteArray {
    /// Slot at `level` (1-based)
    pub fn slot(&self, level: u8) -> Option<&WriteSlot> {
        level_index(level).ok().map(|i| &self.slots[i])
    }

    /// Slots with their levels, level 1 first
    pub fn iter(&self) -> impl Iterator<Item = (u8, &WriteSlot)> {
        self.slots.iter().enumerate().map(|(i, s)| (i as u8 + 1, s))
    }

    /// Whether every slot is empty
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.val.is_none())
    }

    fn set(&mut self, level: u8, val: Option<Value>, who: Option<String>) -> Result<()> {
        let i = level_index(level)?;
        self.slots[i] = match val {
            Some(val) => WriteSlot { val: Some(val), who },
            None => WriteSlot::default(),
        };
        Ok(())
    }

    /// Register rows `level, levelDis, val, who`
    pub fn to_table(&self) -> Table {
        let mut b = TableBuilder::new();
        b.add_col("level");
        b.add_col("levelDis");
        b.add_col("val");
        b.add_col("who");
        for (level, slot) in self.iter() {
            b.add_row(vec![
                Some(Value::Number(Number::new(f64::from(level)))),
                Some(Value::Str(level.to_string())),
                slot.val.clone(),
                slot.who.clone().map(Value::Str),
            ]);
        }
        b.build()
    }
}

fn level_index(level: u8) -> Result<usize> {
    if (1..=LEVELS as u8).contains(&level) {
        Ok(level as usize - 1)
    } else {
        Err(Error::malformed(format!(
            "Write level {} out of range 1-{}",
            level, LEVELS
        )))
    }
}

/// A completed write, for notifying collaborators
#[derive(Debug, Clone, PartialEq)]
pub struct WriteEvent {
    /// Point written
    pub id: EntityId,
    /// Level written
    pub level: u8,
    /// New value, `None` for relinquish
    pub val: Option<Value>,
    /// Writer
    pub who: Option<String>,
}

/// Decides the effective value of a write array
pub trait ArbitrationPolicy: Send + Sync {
    /// Effective value, or `None` when nothing applies
    fn arbitrate(&self, array: &WriteArray) -> Option<Value>;
}

/// Lowest level number with a value wins, else the relinquish default
#[derive(Debug, Clone, Default)]
pub struct HighestLevelWins {
    /// Value used when every level is empty
    pub relinquish_default: Option<Value>,
}

impl ArbitrationPolicy for HighestLevelWins {
    fn arbitrate(&self, array: &WriteArray) -> Option<Value> {
        array
            .iter()
            .find_map(|(_, slot)| slot.val.clone())
            .or_else(|| self.relinquish_default.clone())
    }
}

/// Per-point write arrays, created on first write and never removed
#[derive(Debug, Default)]
pub struct WriteRegister {
    arrays: DashMap<EntityId, Arc<Mutex<WriteArray>>>,
}

impl WriteRegister {
    /// Empty register
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear one level of a point
    ///
    /// # Errors
    /// Returns `MalformedRequest` for a level outside 1-17; no array is
    /// created and no slot changes.
    pub fn write(
        &self,
        id: &EntityId,
        level: u8,
        val: Option<Value>,
        who: Option<String>,
    ) -> Result<WriteEvent> {
        level_index(level)?;
        let array = Arc::clone(
            self.arrays
                .entry(id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(WriteArray::default())))
                .value(),
        );
        let who = val.as_ref().and(who);
        array.lock().set(level, val.clone(), who.clone())?;
        Ok(WriteEvent {
            id: id.clone(),
            level,
            val,
            who,
        })
    }

    /// Snapshot of a point's array; all-empty if never written
    pub fn array(&self, id: &EntityId) -> WriteArray {
        match self.arrays.get(id) {
            Some(array) => array.lock().clone(),
            None => WriteArray::default(),
        }
    }

    /// Snapshot as a 17-row table
    pub fn table(&self, id: &EntityId) -> Table {
        self.array(id).to_table()
    }

    /// Effective value under `policy`
    pub fn arbitrate(&self, id: &EntityId, policy: &dyn ArbitrationPolicy) -> Option<Value> {
        policy.arbitrate(&self.array(id))
    }

    /// Number of points with an array
    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    /// Whether no point has been written
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }
}
