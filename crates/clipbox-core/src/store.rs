//! The link store
//!
//! `LinkStore` owns one long-lived SQLite connection and runs every
//! operation in its own transaction: immediate (write-locking) for
//! mutations, deferred for reads. Construct it once and share it by
//! reference; all methods take `&self`.
//!
//! ## Usage
//!
//! ```ignore
//! let store = LinkStore::open_with_config(config)?;
//!
//! let link = store.add_link("https://example.com", "read", None).await?;
//! store.toggle_pin(link.id)?;
//!
//! let reading = store.get_links_by_category("read");
//! ```
//!
//! Read paths (`get_all_links`, `get_links_by_category`) report an
//! inaccessible database as an empty list. Callers that need to tell the two
//! apart use the `try_` variants.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use anyhow::Context;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::models::{LinkPatch, SavedLink};
use crate::storage::links;
use crate::storage::{ensure_schema, SchemaState, StoreError, StoreResult};
use crate::title::TitleResolver;

/// How long a write waits for another connection's lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Durable local storage of saved links
pub struct LinkStore {
    conn: Mutex<Connection>,
    resolver: TitleResolver,
    /// Database location, `None` for in-memory stores
    path: Option<PathBuf>,
}

impl LinkStore {
    /// Open the store using the default configuration
    pub fn open() -> anyhow::Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Self::open_with_config(&config).context("Failed to open link store")
    }

    /// Open the store with a specific configuration
    ///
    /// Titles are resolved with the strategy chain built from `config`.
    pub fn open_with_config(config: &Config) -> StoreResult<Self> {
        Self::open_with_resolver(config, TitleResolver::from_config(config))
    }

    /// Open the store with a custom title resolver
    pub fn open_with_resolver(config: &Config, resolver: TitleResolver) -> StoreResult<Self> {
        let path = config.sqlite_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Self::from_connection(conn, config.schema_version, Some(path), resolver)
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory(resolver: TitleResolver) -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, crate::storage::SCHEMA_VERSION, None, resolver)
    }

    fn from_connection(
        mut conn: Connection,
        version: i32,
        path: Option<PathBuf>,
        resolver: TitleResolver,
    ) -> StoreResult<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;

        match ensure_schema(&mut conn, version)? {
            SchemaState::Current => {}
            SchemaState::Created => info!("Created link store schema v{}", version),
            SchemaState::Recreated { from } => warn!(
                "Link store schema upgraded from v{} to v{}; saved links were discarded",
                from, version
            ),
            SchemaState::TooNew { found } => {
                return Err(StoreError::SchemaTooNew {
                    path: path.unwrap_or_default(),
                    found,
                    supported: version,
                })
            }
        }

        Ok(Self {
            conn: Mutex::new(conn),
            resolver,
            path,
        })
    }

    /// Location of the database file, if on disk
    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    /// The title resolver used by `add_link`
    pub fn resolver(&self) -> &TitleResolver {
        &self.resolver
    }

    // ==================== Link Operations ====================

    /// Save a new link
    ///
    /// Without a non-blank `custom_title` the title is resolved through the
    /// strategy chain first; that step cannot fail. The connection is only
    /// locked once the title is known.
    pub async fn add_link(
        &self,
        url: &str,
        category: &str,
        custom_title: Option<&str>,
    ) -> StoreResult<SavedLink> {
        let title = match custom_title.filter(|t| !t.trim().is_empty()) {
            Some(title) => title.to_string(),
            None => self.resolver.resolve(url).await,
        };

        let link = SavedLink::new(url, title, category);
        self.with_write(|tx| Ok(links::insert_link(tx, &link)?))?;

        info!("Saved link {} ({}) in {}", link.id, link.url, link.category);
        Ok(link)
    }

    /// Get a link by ID
    pub fn get_link(&self, id: Uuid) -> StoreResult<Option<SavedLink>> {
        self.with_read(|tx| Ok(links::get_link(tx, &id)?))
    }

    /// Get all links, newest first
    ///
    /// Returns an empty list if the database cannot be read.
    pub fn get_all_links(&self) -> Vec<SavedLink> {
        self.try_get_all_links().unwrap_or_else(|e| {
            warn!("Could not read links: {}", e);
            Vec::new()
        })
    }

    /// Get all links, surfacing storage faults
    pub fn try_get_all_links(&self) -> StoreResult<Vec<SavedLink>> {
        self.with_read(|tx| Ok(links::list_links(tx)?))
    }

    /// Get the links in one category: pinned first, then newest first
    ///
    /// Returns an empty list if the database cannot be read.
    pub fn get_links_by_category(&self, category: &str) -> Vec<SavedLink> {
        self.try_get_links_by_category(category)
            .unwrap_or_else(|e| {
                warn!("Could not read links in category {}: {}", category, e);
                Vec::new()
            })
    }

    /// Get the links in one category, surfacing storage faults
    pub fn try_get_links_by_category(&self, category: &str) -> StoreResult<Vec<SavedLink>> {
        self.with_read(|tx| Ok(links::list_links_by_category(tx, category)?))
    }

    /// Change the title and/or category of a link
    pub fn update_link(&self, id: Uuid, patch: &LinkPatch) -> StoreResult<SavedLink> {
        let link = self.with_write(|tx| {
            let mut link = links::get_link(tx, &id)?.ok_or(StoreError::NotFound(id))?;
            link.apply(patch);
            links::update_link(tx, &link)?;
            Ok(link)
        })?;

        debug!("Updated link {}", id);
        Ok(link)
    }

    /// Delete a link
    ///
    /// Deleting an unknown id succeeds.
    pub fn delete_link(&self, id: Uuid) -> StoreResult<()> {
        let removed = self.with_write(|tx| Ok(links::delete_link(tx, &id)?))?;

        if removed == 0 {
            debug!("Delete of unknown link {} ignored", id);
        } else {
            info!("Deleted link {}", id);
        }
        Ok(())
    }

    /// Flip the pinned flag of a link
    pub fn toggle_pin(&self, id: Uuid) -> StoreResult<()> {
        self.with_write(|tx| match links::toggle_pin(tx, &id)? {
            0 => Err(StoreError::NotFound(id)),
            _ => Ok(()),
        })?;

        debug!("Toggled pin on link {}", id);
        Ok(())
    }

    /// Count saved links
    pub fn link_count(&self) -> StoreResult<usize> {
        let count = self.with_read(|tx| Ok(links::count_links(tx)?))?;
        Ok(count as usize)
    }

    // ==================== Export / Import ====================

    /// Every saved link, newest first
    pub fn export_links(&self) -> StoreResult<Vec<SavedLink>> {
        self.try_get_all_links()
    }

    /// Every saved link as a pretty-printed JSON array
    pub fn export_json(&self) -> StoreResult<String> {
        let links = self.export_links()?;
        Ok(serde_json::to_string_pretty(&links)?)
    }

    /// Replace the whole record set with `records`
    ///
    /// `records` is taken in export order (newest first) and inserted oldest
    /// first, so links sharing a timestamp list as they did before export.
    /// Runs in one transaction: if any record is rejected (e.g. a repeated
    /// id) nothing changes.
    pub fn import_links(&self, records: &[SavedLink]) -> StoreResult<usize> {
        self.with_write(|tx| {
            links::clear_links(tx)?;
            for link in records.iter().rev() {
                links::insert_link(tx, link)?;
            }
            Ok(())
        })?;

        info!("Imported {} links, replacing previous contents", records.len());
        Ok(records.len())
    }

    /// Replace the whole record set from a JSON export
    pub fn import_json(&self, json: &str) -> StoreResult<usize> {
        let records: Vec<SavedLink> = serde_json::from_str(json)?;
        self.import_links(&records)
    }

    // ==================== Transactions ====================

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))
    }

    /// Run `f` in a read-write transaction, committing on success
    fn with_write<T>(
        &self,
        f: impl FnOnce(&Transaction<'_>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Run `f` in a read transaction
    fn with_read<T>(&self, f: impl FnOnce(&Transaction<'_>) -> StoreResult<T>) -> StoreResult<T> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}
