//! Sitemap index generation.
//!
//! The index is derived entirely from the database's sitemap list and is
//! rebuilt from scratch on every change; it is never patched in place.

use crate::error::{AppError, Result};
use crate::models::{IndexEntry, Store};
use crate::storage::Layout;
use crate::storage::safe_io::{atomic_write, read_optional};
use crate::storage::xml;
use crate::utils::url::join;

/// Writes `sitemap_index.xml` for one output directory.
#[derive(Debug, Clone)]
pub struct IndexGenerator {
    layout: Layout,
    base_url: String,
}

impl IndexGenerator {
    pub fn new(layout: Layout, base_url: impl Into<String>) -> Self {
        Self {
            layout,
            base_url: base_url.into(),
        }
    }

    /// One entry per sitemap, in creation order.
    pub fn entries(&self, store: &Store) -> Vec<IndexEntry> {
        store
            .sitemaps
            .iter()
            .map(|info| IndexEntry {
                loc: join(&self.base_url, &info.filename),
                lastmod: info.last_modified.date_naive(),
            })
            .collect()
    }

    /// Rebuild and atomically replace the index. Returns the entry count.
    pub fn regenerate(&self, store: &Store) -> Result<usize> {
        let path = self.layout.index_path();
        let entries = self.entries(store);
        let bytes = xml::encode_index(&entries)
            .map_err(|e| AppError::partition(&path, format!("encoding index: {e}")))?;
        atomic_write(&path, &bytes)
            .map_err(|e| AppError::partition(&path, format!("writing index: {e}")))?;
        log::debug!("Regenerated {} with {} sitemaps", path.display(), entries.len());
        Ok(entries.len())
    }

    /// Entries of the index currently on disk; empty if it was never written.
    pub fn load(&self) -> Result<Vec<IndexEntry>> {
        let path = self.layout.index_path();
        let Some(bytes) = read_optional(&path)
            .map_err(|e| AppError::partition(&path, format!("reading index: {e}")))?
        else {
            return Ok(Vec::new());
        };
        let text = String::from_utf8_lossy(&bytes);
        xml::decode_index(&text)
            .map_err(|e| AppError::partition(&path, format!("reading index: {e}")))
    }
}
