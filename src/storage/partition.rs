//! Sitemap partitions: capped `<urlset>` files and rollover.
//!
//! A partition is full once it holds `capacity` entries or has been sealed.
//! New entries always go to the current partition; when it is full the next
//! `{prefix}_{n}.xml` is registered and becomes current. Full partitions are
//! never written again.

use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::sitemap::MAX_SITEMAP_BYTES;
use crate::models::{SitemapInfo, Store, UrlEntry};
use crate::storage::Layout;
use crate::storage::safe_io::{atomic_write, read_optional};
use crate::storage::xml;

/// Where an appended entry ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Sitemap file that received the entry
    pub filename: String,
    /// Entry count of that file after the append
    pub url_count: usize,
}

/// Reads and writes partition files under one output directory.
#[derive(Debug, Clone)]
pub struct PartitionWriter {
    layout: Layout,
    prefix: String,
    capacity: usize,
    max_bytes: usize,
}

impl PartitionWriter {
    pub fn new(layout: Layout, prefix: impl Into<String>, capacity: usize) -> Self {
        Self {
            layout,
            prefix: prefix.into(),
            capacity,
            max_bytes: MAX_SITEMAP_BYTES,
        }
    }

    /// Override the serialized size cap.
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Name for the next partition: `{prefix}_{n}.xml`, `n` counting from 1.
    fn next_filename(&self, store: &Store) -> String {
        format!("{}_{}.xml", self.prefix, store.sitemaps.len() + 1)
    }

    /// Register a new, empty partition and make it current.
    pub fn create_partition(&self, store: &mut Store) -> String {
        let filename = self.next_filename(store);
        store.sitemaps.push(SitemapInfo::new(&filename));
        store.current_sitemap = filename.clone();
        log::info!("Created new sitemap {}", filename);
        filename
    }

    /// Freeze the current partition so the next write starts a new one.
    pub fn seal_current(&self, store: &mut Store) {
        let current = store.current_sitemap.clone();
        if let Some(info) = store.sitemap_mut(&current) {
            info.sealed = true;
            log::debug!("Sealed {} at {} entries", current, info.url_count);
        }
    }

    /// The partition new entries go to, creating one if none is open.
    pub fn current_partition_for_write(&self, store: &mut Store) -> String {
        match store.current() {
            Some(info) if !info.is_full(self.capacity) => info.filename.clone(),
            Some(info) => {
                log::debug!(
                    "Sitemap {} is full ({} entries), rolling over",
                    info.filename,
                    info.url_count
                );
                self.create_partition(store)
            }
            None => self.create_partition(store),
        }
    }

    /// Entries of a partition file; empty if the file does not exist.
    pub fn load(&self, filename: &str) -> Result<Vec<UrlEntry>> {
        let path = self.layout.sitemap_path(filename);
        let Some(bytes) = read_optional(&path).map_err(|e| AppError::partition(&path, e))? else {
            return Ok(Vec::new());
        };
        let text = String::from_utf8(bytes)
            .map_err(|e| AppError::partition(&path, format!("not valid UTF-8: {e}")))?;
        xml::decode_urlset(&text).map_err(|e| AppError::partition(&path, e))
    }

    /// Serialize and atomically replace a partition file.
    ///
    /// Fails with `PartitionFull` without touching the file when the document
    /// would exceed the size cap. Returns the number of bytes written.
    pub fn save(&self, filename: &str, entries: &[UrlEntry]) -> Result<usize> {
        let path = self.layout.sitemap_path(filename);
        let bytes = xml::encode_urlset(entries).map_err(|e| AppError::partition(&path, e))?;
        if bytes.len() > self.max_bytes {
            return Err(AppError::PartitionFull {
                name: filename.to_string(),
                size: bytes.len(),
                limit: self.max_bytes,
            });
        }
        atomic_write(&path, &bytes).map_err(|e| AppError::partition(&path, e))?;
        Ok(bytes.len())
    }

    /// Append one entry to a registered partition and update its record.
    ///
    /// The store is changed in memory only; the caller persists it.
    pub fn append(&self, store: &mut Store, filename: &str, entry: &UrlEntry) -> Result<usize> {
        let idx = store
            .sitemaps
            .iter()
            .position(|s| s.filename == filename)
            .ok_or_else(|| {
                AppError::partition(
                    self.layout.sitemap_path(filename),
                    "sitemap is not registered in the database",
                )
            })?;

        let mut entries = self.load(filename)?;
        let recorded = store.sitemaps[idx].url_count;
        if entries.len() != recorded {
            log::warn!(
                "{} holds {} entries but the database records {}",
                filename,
                entries.len(),
                recorded
            );
        }
        entries.push(entry.clone());
        self.save(filename, &entries)?;

        let info = &mut store.sitemaps[idx];
        info.url_count += 1;
        info.last_modified = Utc::now();
        Ok(info.url_count)
    }

    /// Place an entry in the current partition, rolling over on count or size.
    pub fn write(&self, store: &mut Store, entry: &UrlEntry) -> Result<Placement> {
        let filename = self.current_partition_for_write(store);
        match self.append(store, &filename, entry) {
            Ok(url_count) => Ok(Placement { filename, url_count }),
            Err(AppError::PartitionFull { size, limit, .. })
                if store.sitemap(&filename).is_some_and(|s| s.url_count > 0) =>
            {
                log::info!(
                    "{} would reach {} bytes (limit {}), starting a new sitemap",
                    filename,
                    size,
                    limit
                );
                self.seal_current(store);
                let filename = self.current_partition_for_write(store);
                let url_count = self.append(store, &filename, entry)?;
                Ok(Placement { filename, url_count })
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sitemap::MAX_URLS_PER_SITEMAP;
    use tempfile::TempDir;

    fn writer(tmp: &TempDir, capacity: usize) -> PartitionWriter {
        PartitionWriter::new(Layout::new(tmp.path()), "sitemap", capacity)
    }

    fn entry(path: &str) -> UrlEntry {
        UrlEntry::new(format!("https://example.com/{path}"))
    }

    #[test]
    fn test_first_write_creates_sitemap_1() {
        let tmp = TempDir::new().unwrap();
        let writer = writer(&tmp, 10);
        let mut store = Store::default();

        let placement = writer.write(&mut store, &entry("a")).unwrap();
        assert_eq!(placement.filename, "sitemap_1.xml");
        assert_eq!(placement.url_count, 1);
        assert_eq!(store.current_sitemap, "sitemap_1.xml");
        assert_eq!(writer.load("sitemap_1.xml").unwrap(), vec![entry("a")]);
    }

    #[test]
    fn test_current_partition_reused_until_full() {
        let tmp = TempDir::new().unwrap();
        let writer = writer(&tmp, 2);
        let mut store = Store::default();

        let first = writer.current_partition_for_write(&mut store);
        let again = writer.current_partition_for_write(&mut store);
        assert_eq!(first, again);
        assert_eq!(store.sitemaps.len(), 1);

        store.sitemaps[0].url_count = 2;
        let next = writer.current_partition_for_write(&mut store);
        assert_eq!(next, "sitemap_2.xml");
        assert_eq!(store.current_sitemap, "sitemap_2.xml");
    }

    #[test]
    fn test_rollover_at_protocol_capacity() {
        let tmp = TempDir::new().unwrap();
        let writer = writer(&tmp, MAX_URLS_PER_SITEMAP);
        let mut store = Store::default();

        writer.create_partition(&mut store);
        store.sitemaps[0].url_count = MAX_URLS_PER_SITEMAP - 1;
        assert_eq!(writer.current_partition_for_write(&mut store), "sitemap_1.xml");

        store.sitemaps[0].url_count = MAX_URLS_PER_SITEMAP;
        assert_eq!(writer.current_partition_for_write(&mut store), "sitemap_2.xml");
    }

    #[test]
    fn test_capacity_plus_one_gives_two_partitions() {
        let tmp = TempDir::new().unwrap();
        let writer = writer(&tmp, 3);
        let mut store = Store::default();

        for path in ["a", "b", "c", "d"] {
            writer.write(&mut store, &entry(path)).unwrap();
        }

        assert_eq!(store.sitemaps.len(), 2);
        assert_eq!(store.sitemaps[0].url_count, 3);
        assert_eq!(store.sitemaps[1].url_count, 1);
        assert_eq!(writer.load("sitemap_1.xml").unwrap().len(), 3);
        assert_eq!(writer.load("sitemap_2.xml").unwrap(), vec![entry("d")]);
    }

    #[test]
    fn test_full_partition_is_never_backfilled() {
        let tmp = TempDir::new().unwrap();
        let writer = writer(&tmp, 1);
        let mut store = Store::default();

        writer.write(&mut store, &entry("a")).unwrap();
        writer.write(&mut store, &entry("b")).unwrap();
        writer.write(&mut store, &entry("c")).unwrap();

        let names: Vec<_> = store.sitemaps.iter().map(|s| s.filename.as_str()).collect();
        assert_eq!(names, ["sitemap_1.xml", "sitemap_2.xml", "sitemap_3.xml"]);
        assert!(store.sitemaps.iter().all(|s| s.url_count == 1));
    }

    #[test]
    fn test_sealed_partition_rolls_over() {
        let tmp = TempDir::new().unwrap();
        let writer = writer(&tmp, 10);
        let mut store = Store::default();

        writer.write(&mut store, &entry("a")).unwrap();
        writer.seal_current(&mut store);
        let placement = writer.write(&mut store, &entry("b")).unwrap();

        assert_eq!(placement.filename, "sitemap_2.xml");
        assert!(store.sitemaps[0].sealed);
        assert_eq!(store.sitemaps[0].url_count, 1);
    }

    #[test]
    fn test_size_cap_seals_and_rolls_over() {
        let tmp = TempDir::new().unwrap();
        let empty_doc = xml::encode_urlset(&[]).unwrap().len();
        let one_entry = xml::encode_urlset(&[entry("aaaa")]).unwrap().len();
        // room for exactly one entry per file
        let writer = writer(&tmp, 10).with_max_bytes(one_entry + (one_entry - empty_doc) / 2);
        let mut store = Store::default();

        writer.write(&mut store, &entry("aaaa")).unwrap();
        let placement = writer.write(&mut store, &entry("bbbb")).unwrap();

        assert_eq!(placement.filename, "sitemap_2.xml");
        assert!(store.sitemaps[0].sealed);
        assert_eq!(store.sitemaps[0].url_count, 1);
        assert_eq!(writer.load("sitemap_1.xml").unwrap(), vec![entry("aaaa")]);
        assert_eq!(writer.load("sitemap_2.xml").unwrap(), vec![entry("bbbb")]);
        assert_eq!(store.sitemaps.iter().filter(|s| !s.is_full(10)).count(), 1);
    }

    #[test]
    fn test_entry_larger_than_cap_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let writer = writer(&tmp, 10).with_max_bytes(64);
        let mut store = Store::default();

        let err = writer.write(&mut store, &entry("far-too-long")).unwrap_err();
        assert!(matches!(err, AppError::PartitionFull { .. }));
        assert!(!tmp.path().join("sitemap_1.xml").exists());
        assert_eq!(store.sitemaps[0].url_count, 0);
    }

    #[test]
    fn test_append_to_unregistered_partition_fails() {
        let tmp = TempDir::new().unwrap();
        let writer = writer(&tmp, 10);
        let mut store = Store::default();

        let err = writer
            .append(&mut store, "sitemap_9.xml", &entry("a"))
            .unwrap_err();
        assert!(matches!(err, AppError::PartitionIo { .. }));
    }

    #[test]
    fn test_append_tolerates_unknown_changefreq_in_existing_file() {
        let tmp = TempDir::new().unwrap();
        let writer = writer(&tmp, 10);
        let mut store = Store::default();
        writer.create_partition(&mut store);
        std::fs::write(
            tmp.path().join("sitemap_1.xml"),
            r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><url><loc>https://example.com/old</loc><changefreq>sometimes</changefreq></url></urlset>"#,
        )
        .unwrap();
        store.sitemaps[0].url_count = 1;

        let placement = writer.write(&mut store, &entry("new")).unwrap();
        assert_eq!(placement.filename, "sitemap_1.xml");
        assert_eq!(placement.url_count, 2);
        let entries = writer.load("sitemap_1.xml").unwrap();
        assert_eq!(entries[0], UrlEntry::new("https://example.com/old"));
        assert_eq!(entries[1], entry("new"));
    }

    #[test]
    fn test_corrupt_partition_is_a_partition_error() {
        let tmp = TempDir::new().unwrap();
        let writer = writer(&tmp, 10);
        let mut store = Store::default();
        writer.create_partition(&mut store);
        std::fs::write(tmp.path().join("sitemap_1.xml"), "not a sitemap").unwrap();

        let err = writer.write(&mut store, &entry("a")).unwrap_err();
        assert!(matches!(err, AppError::PartitionIo { .. }));
        assert_eq!(store.sitemaps[0].url_count, 0);
    }
}
