//! haystackdb - a tagged-entity database speaking the Project Haystack operations
//!
//! Entities are tag dictionaries addressed by id. Clients read them by id or
//! filter, subscribe to changes through polled watches, read and write
//! time-series history, and write to points through a 17-level priority
//! array.
//!
//! # Quick Start
//!
//! ```ignore
//! use haystackdb::{Database, Dict, Executor, Ref, Table};
//!
//! let executor = Executor::new(Database::ephemeral()?);
//! executor.database().store().put(Dict::new().with("id", Ref::new("s1")).with_marker("site"))?;
//!
//! let req = Table::from_dicts([Dict::new().with("filter", "site")]);
//! let sites = executor.execute("read", &req)?;
//! ```
//!
//! # Architecture
//!
//! Every operation goes through the [`Executor`], which resolves a name (or
//! request path) to a handler and returns a response [`Table`]. Storage,
//! history and watch internals live in the member crates and are not
//! re-exported beyond the types needed to build requests and configure a
//! [`Database`].

// Re-export the public API from haystack-executor
pub use haystack_executor::*;

pub use haystack_core::{DateTimeRange, HistoryItem, Number, TimeZone, ZonedDateTime};
pub use haystack_engine::{HistoryBackend, HistoryConfig};
