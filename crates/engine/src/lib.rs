//! Database engine for the Haystack server
//!
//! This crate composes the storage layer into the server's components:
//! - EntityAccess: checked/unchecked reads over any entity store
//! - WriteRegister: 17-level priority write arrays
//! - History: time-series reads and writes over a pluggable backend
//! - WatchManager: lease-based subscriptions with change polling
//! - Database: composition root, configuration, navigation, `about`
//!
//! The engine is the only component that knows how these pieces are wired
//! together; the executor only calls into `Database`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod access;
pub mod database;
pub mod history;
pub mod point_write;
pub mod watch;

pub use access::EntityAccess;
pub use database::{Database, HistoryBackend, HistoryConfig, ServerConfig, CONFIG_FILE_NAME};
pub use history::{History, HistoryStore, MemoryHistory, SyntheticHistory, MAX_SYNTHETIC_SAMPLES};
pub use point_write::{
    ArbitrationPolicy, HighestLevelWins, WriteArray, WriteEvent, WriteRegister, WriteSlot, LEVELS,
};
pub use watch::{Watch, WatchManager};
