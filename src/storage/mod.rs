//! On-disk persistence for sitemaps, the index, and the database.
//!
//! Every file lives directly under the configured output directory and is
//! replaced atomically (temp file + rename), so readers never see a partial
//! document.
//!
//! ## Directory Structure
//!
//! ```text
//! {output_dir}/
//! ├── .sitemaptool_db.json   # Entry store: hashes + per-sitemap metadata
//! ├── .sitemaptool_db.lock   # Advisory lock guarding read-modify-write
//! ├── sitemap_index.xml      # Derived: one <sitemap> per partition
//! ├── sitemap_1.xml          # Frozen at capacity
//! └── sitemap_2.xml          # Current: accepting new entries
//! ```

pub mod index;
pub mod partition;
pub mod safe_io;
pub mod store;
pub mod xml;

use std::path::{Path, PathBuf};

// Re-export for convenience
pub use index::IndexGenerator;
pub use partition::PartitionWriter;
pub use safe_io::FileLock;
pub use store::StoreFile;

/// Entry store file name.
pub const DB_FILE: &str = ".sitemaptool_db.json";

/// Lock file name, kept beside the entry store.
pub const LOCK_FILE: &str = ".sitemaptool_db.lock";

/// Sitemap index file name.
pub const INDEX_FILE: &str = "sitemap_index.xml";

/// Paths of every file under one output directory.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn db_path(&self) -> PathBuf {
        self.root.join(DB_FILE)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    /// Path of a sitemap file by name.
    pub fn sitemap_path(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }
}
