//! Database struct and open logic
//!
//! `Database` is the composition root of the server: it owns the entity
//! store and wires the write register, historian and watch manager to it.
//!
//! ```text
//! let db = Database::open(ServerConfig::default())?;
//! let site = db.entities().read("site", true)?;
//! ```
//!
//! Everything is in memory. `open` loads the configured seed file;
//! `ephemeral` starts empty.

pub mod config;

pub use config::{HistoryBackend, HistoryConfig, ServerConfig, CONFIG_FILE_NAME};

use std::sync::Arc;
use tracing::info;

use haystack_core::{Dict, Entity, EntityId, Error, Result, Table, TimeZone, Value, ZonedDateTime};
use haystack_storage::{EntityStore, MemoryStore};

use crate::access::EntityAccess;
use crate::history::{History, HistoryStore, MemoryHistory, SyntheticHistory};
use crate::point_write::WriteRegister;
use crate::watch::WatchManager;

/// Protocol version reported by `about`
pub const HAYSTACK_VERSION: &str = "3.0";

/// The server database
pub struct Database {
    config: ServerConfig,
    tz: TimeZone,
    boot_time: ZonedDateTime,
    store: Arc<MemoryStore>,
    entities: Arc<dyn EntityStore>,
    register: WriteRegister,
    history: History,
    watches: WatchManager,
}

impl Database {
    /// Open a database described by `config`, loading its seed file
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or the seed file exists
    /// but cannot be read.
    pub fn open(config: ServerConfig) -> Result<Arc<Self>> {
        config.validate()?;
        let store = Arc::new(MemoryStore::new());
        if let Some(seed) = &config.seed {
            store.load_file(seed)?;
        }
        let db = Self::assemble(config, store)?;
        info!(
            server = %db.config.server_name,
            entities = db.store.len(),
            history = ?db.config.history.backend,
            "Database opened"
        );
        Ok(Arc::new(db))
    }

    /// Empty database with default settings
    pub fn ephemeral() -> Result<Arc<Self>> {
        Self::with_store(ServerConfig::default(), Arc::new(MemoryStore::new()))
    }

    /// Database over an existing store; `config.seed` is ignored
    pub fn with_store(config: ServerConfig, store: Arc<MemoryStore>) -> Result<Arc<Self>> {
        config.validate()?;
        Ok(Arc::new(Self::assemble(config, store)?))
    }

    fn assemble(config: ServerConfig, store: Arc<MemoryStore>) -> Result<Self> {
        let tz = config.timezone()?;
        let entities: Arc<dyn EntityStore> = store.clone();
        let backend: Arc<dyn HistoryStore> = match config.history.backend {
            HistoryBackend::Synthetic => Arc::new(SyntheticHistory::new(config.his_interval())),
            HistoryBackend::Memory => Arc::new(MemoryHistory::new()),
        };
        Ok(Self {
            boot_time: ZonedDateTime::now(&tz),
            history: History::new(Arc::clone(&entities), backend),
            watches: WatchManager::new(Arc::clone(&entities), config.watch_lease()),
            register: WriteRegister::new(),
            tz,
            store,
            entities,
            config,
        })
    }

    /// Configuration the database was opened with
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Server timezone
    pub fn tz(&self) -> &TimeZone {
        &self.tz
    }

    /// Entity reads (checked/unchecked via [`EntityAccess`])
    pub fn entities(&self) -> &dyn EntityStore {
        self.entities.as_ref()
    }

    /// The in-memory store, for loading and updating entities
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Priority write arrays
    pub fn register(&self) -> &WriteRegister {
        &self.register
    }

    /// Historian
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Watch table
    pub fn watches(&self) -> &WatchManager {
        &self.watches
    }

    /// Timezone for range dates of `id`: its `tz` tag, else the server's
    pub fn tz_of(&self, id: &EntityId) -> TimeZone {
        self.entities
            .on_read_by_id(id)
            .and_then(|e| e.get_str("tz").and_then(TimeZone::find))
            .unwrap_or_else(|| self.tz.clone())
    }

    /// Server summary
    pub fn about(&self) -> Dict {
        let uri = Value::Uri(self.config.vendor_uri.clone());
        Dict::new()
            .with("haystackVersion", HAYSTACK_VERSION)
            .with("serverName", self.config.server_name.as_str())
            .with("serverTime", ZonedDateTime::now(&self.tz))
            .with("serverBootTime", self.boot_time.clone())
            .with("tz", self.tz.name())
            .with("productName", "haystackdb")
            .with("productVersion", env!("CARGO_PKG_VERSION"))
            .with("productUri", uri.clone())
            .with("moduleName", env!("CARGO_PKG_NAME"))
            .with("moduleVersion", env!("CARGO_PKG_VERSION"))
            .with("vendorName", self.config.vendor_name.as_str())
            .with("vendorUri", uri)
    }

    /// Children of a navigation node
    ///
    /// No node lists sites, a site lists its equips, an equip lists its
    /// points, anything else has no children. Every row gains a `navId`
    /// naming the node it would open.
    pub fn nav(&self, nav_id: Option<&EntityId>) -> Result<Table> {
        let base = match nav_id {
            Some(id) => self.entities.read_by_id(id, false)?,
            None => None,
        };
        let filter = match &base {
            None if nav_id.is_none() => "site".to_string(),
            None => return Ok(Table::empty()),
            Some(b) if b.has("site") => format!("equip and siteRef=={}", id_code(b)?),
            Some(b) if b.has("equip") => format!("point and equipRef=={}", id_code(b)?),
            Some(_) => return Ok(Table::empty()),
        };
        let children = self.entities.read_all(&filter, None)?;
        let rows: Vec<Dict> = children
            .rows()
            .map(|row| {
                let dict = row.to_dict();
                match dict.id().cloned() {
                    Some(id) => dict.with("navId", id.as_str()),
                    None => dict,
                }
            })
            .collect();
        Ok(Table::from_dicts(&rows))
    }

    /// Run an action on an entity
    ///
    /// There are no built-in actions; the request is logged and an empty
    /// table returned.
    pub fn invoke_action(&self, id: &EntityId, action: &str, args: &Dict) -> Result<Table> {
        let entity = self
            .entities
            .read_by_id(id, true)?
            .ok_or_else(|| Error::unknown_entity(id.to_code()))?;
        info!(target: "haystack::action", entity = %entity.dis(), action, args = args.len(), "invokeAction");
        Ok(Table::empty())
    }

    /// Resolve an entity, failing with `UnknownEntity`
    pub fn entity(&self, id: &EntityId) -> Result<Arc<Entity>> {
        self.entities
            .read_by_id(id, true)?
            .ok_or_else(|| Error::unknown_entity(id.to_code()))
    }
}

fn id_code(entity: &Entity) -> Result<String> {
    entity
        .id()
        .map(EntityId::to_code)
        .ok_or_else(|| Error::malformed("Entity missing Ref 'id' tag"))
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("server_name", &self.config.server_name)
            .field("entities", &self.store.len())
            .field("watches", &self.watches)
            .finish_non_exhaustive()
    }
}
