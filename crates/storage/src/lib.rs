//! Storage layer for the Haystack server
//!
//! This crate implements the entity storage collaborators:
//! - EntityStore: the minimal read hooks every backend provides
//! - Filter: parser and evaluator for filter expressions
//! - MemoryStore: DashMap-backed in-memory store, seedable from a table file
//!
//! The checked/unchecked read policy is not implemented here; it lives in
//! the engine's `EntityAccess` layer so every backend gets the same policy.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod filter;
pub mod memory;
pub mod store;

pub use filter::{CmpOp, Filter, Path};
pub use memory::MemoryStore;
pub use store::EntityStore;
