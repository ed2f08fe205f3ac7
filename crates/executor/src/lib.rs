//! # Haystack Executor
//!
//! The operation layer of the Haystack server: a fixed registry of named
//! operations, each taking a request [`Table`] and returning a response
//! table.
//!
//! ## Quick Start
//!
//! ```text
//! use haystack_executor::{Executor, Table};
//! use haystack_engine::Database;
//!
//! let executor = Executor::new(Database::ephemeral()?);
//! let ops = executor.execute("ops", &Table::empty())?;
//! ```
//!
//! ## Operations
//!
//! | Operation | Purpose |
//! |-----------|---------|
//! | `about`, `ops`, `formats` | server metadata |
//! | `read`, `nav` | entity queries |
//! | `watchSub`, `watchUnsub`, `watchPoll` | change subscriptions |
//! | `pointWrite` | priority write arrays |
//! | `hisRead`, `hisWrite` | time series |
//! | `invokeAction` | entity actions |

#![warn(missing_docs)]

mod convert;
mod error;
mod executor;
mod operation;
mod request;
pub mod route;

// Handler modules
mod handlers;


// =============================================================================
// Public API - Everything users need is re-exported here
// =============================================================================

pub use error::{Error, Status};
pub use executor::Executor;
pub use operation::{find as find_operation, operations, Handler, Operation};
pub use route::Route;

// Re-export data types so users don't need haystack-core directly
pub use haystack_core::{Dict, EntityId, Ref, Table, TableBuilder, Value};

// Re-export database types so users don't need haystack-engine directly
pub use haystack_engine::{Database, ServerConfig};

/// Result type for executor operations
pub type Result<T> = std::result::Result<T, Error>;
