//! Entry store persistence.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::Store;
use crate::storage::safe_io::{atomic_write_json, read_optional};

/// The JSON database file holding a [`Store`].
#[derive(Debug, Clone)]
pub struct StoreFile {
    path: PathBuf,
}

impl StoreFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the store, creating and persisting an empty one if the file is absent.
    ///
    /// Writes to disk, so callers must hold the exclusive lock.
    pub fn load(&self) -> Result<Store> {
        match self.read_existing()? {
            Some(store) => Ok(store),
            None => {
                log::info!("No database at {}, creating one", self.path.display());
                let mut store = Store::default();
                self.save(&mut store)?;
                Ok(store)
            }
        }
    }

    /// Read the store without touching disk; an absent file reads as empty.
    ///
    /// Safe under the shared lock.
    pub fn read(&self) -> Result<Store> {
        Ok(self.read_existing()?.unwrap_or_default())
    }

    fn read_existing(&self) -> Result<Option<Store>> {
        let Some(bytes) = read_optional(&self.path).map_err(|e| AppError::store(&self.path, e))?
        else {
            return Ok(None);
        };
        let store: Store = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::store(&self.path, format!("corrupt database: {e}")))?;
        log::debug!(
            "Loaded database: {} sitemaps, {} URLs",
            store.sitemaps.len(),
            store.url_count()
        );
        Ok(Some(store))
    }

    /// Persist atomically, refreshing `last_updated` first.
    pub fn save(&self, store: &mut Store) -> Result<()> {
        store.last_updated = Utc::now();
        atomic_write_json(&self.path, store).map_err(|e| AppError::store(&self.path, e))
    }
}
