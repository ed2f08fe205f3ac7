//! The Executor - single entry point to the Haystack operations.
//!
//! The Executor is a stateless dispatcher that routes named operations to
//! their handlers. All state lives in the engine's `Database`.

use std::sync::Arc;
use tracing::{debug, warn};

use haystack_core::Table;
use haystack_engine::Database;

use crate::operation::{self, Operation};
use crate::route::{self, Route};
use crate::{Error, Result};

/// The operation executor.
///
/// # Thread Safety
///
/// Executor is `Send + Sync` and can be shared across threads; requests
/// for different entities and watches run independently.
///
/// # Example
///
/// ```ignore
/// use haystackdb::{Executor, Table};
///
/// let executor = Executor::new(Database::ephemeral()?);
/// let about = executor.execute("about", &Table::empty())?;
/// ```
#[derive(Debug, Clone)]
pub struct Executor {
    db: Arc<Database>,
}

impl Executor {
    /// Create a new executor over a database.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// The database operations run against.
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// All registered operations.
    pub fn operations(&self) -> &'static [Operation] {
        operation::operations()
    }

    /// Execute the named operation.
    ///
    /// Returns the response table or an error.
    pub fn execute(&self, name: &str, req: &Table) -> Result<Table> {
        let op = operation::find(name).ok_or_else(|| Error::UnknownOperation {
            op: name.to_string(),
        })?;
        debug!(target: "haystack::op", op = op.name, rows = req.num_rows(), "Executing");
        let result = op.call(&self.db, req);
        if let Err(e) = &result {
            warn!(target: "haystack::op", op = op.name, error = %e, "Operation failed");
        }
        result
    }

    /// Execute a request addressed by path.
    ///
    /// An empty path is answered by `about`, the way a transport would
    /// after following the redirect.
    pub fn execute_path(&self, path: &str, req: &Table) -> Result<Table> {
        match route::resolve(path) {
            Route::Redirect(op) => self.execute(op, &Table::empty()),
            Route::Op(op) => self.execute(&op, req),
        }
    }

    /// Execute several requests in order, one result per request.
    ///
    /// A failing request does not stop later ones.
    pub fn execute_many<'a, I>(&self, requests: I) -> Vec<Result<Table>>
    where
        I: IntoIterator<Item = (&'a str, &'a Table)>,
    {
        requests
            .into_iter()
            .map(|(name, req)| self.execute(name, req))
            .collect()
    }
}
