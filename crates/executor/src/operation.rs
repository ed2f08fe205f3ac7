//! The operation registry.
//!
//! Operations are a fixed, read-only table built at compile time. The
//! name index is built once on first lookup and never changes afterwards.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

use haystack_core::Table;
use haystack_engine::Database;

use crate::handlers;
use crate::Result;

/// Handler signature shared by every operation
pub type Handler = fn(&Database, &Table) -> Result<Table>;

/// A named protocol operation
pub struct Operation {
    /// Name used in request paths
    pub name: &'static str,
    /// One-line description reported by `ops`
    pub summary: &'static str,
    handler: Handler,
}

impl Operation {
    /// Run the handler
    pub fn call(&self, db: &Database, req: &Table) -> Result<Table> {
        (self.handler)(db, req)
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("summary", &self.summary)
            .finish()
    }
}

const fn op(name: &'static str, summary: &'static str, handler: Handler) -> Operation {
    Operation {
        name,
        summary,
        handler,
    }
}

static OPERATIONS: [Operation; 12] = [
    op("about", "Summary information for server", handlers::about::about),
    op("ops", "Operations supported by this server", handlers::about::ops),
    op(
        "formats",
        "Grid data formats supported by this server",
        handlers::about::formats,
    ),
    op("read", "Read entity records in database", handlers::read::read),
    op("nav", "Navigate record tree", handlers::read::nav),
    op("watchSub", "Watch subscription", handlers::watch::watch_sub),
    op("watchUnsub", "Watch unsubscription", handlers::watch::watch_unsub),
    op("watchPoll", "Watch poll cov or refresh", handlers::watch::watch_poll),
    op(
        "pointWrite",
        "Read/write writable point priority array",
        handlers::point_write::point_write,
    ),
    op("hisRead", "Read time series from historian", handlers::his::his_read),
    op(
        "hisWrite",
        "Write time series data to historian",
        handlers::his::his_write,
    ),
    op(
        "invokeAction",
        "Invoke action on target entity",
        handlers::action::invoke_action,
    ),
];

static BY_NAME: Lazy<HashMap<&'static str, &'static Operation>> =
    Lazy::new(|| OPERATIONS.iter().map(|op| (op.name, op)).collect());

/// Every operation, in registration order
pub fn operations() -> &'static [Operation] {
    &OPERATIONS
}

/// Operation by exact name
pub fn find(name: &str) -> Option<&'static Operation> {
    BY_NAME.get(name).copied()
}
