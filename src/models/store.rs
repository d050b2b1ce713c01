//! Entry store: the persisted bookkeeping record.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata about one sitemap file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitemapInfo {
    /// File name relative to the output directory, e.g. `sitemap_1.xml`
    pub filename: String,

    /// Number of `<url>` entries in the file
    pub url_count: usize,

    /// Last time an entry was appended (or the file was created)
    pub last_modified: DateTime<Utc>,

    /// Frozen below capacity by an explicit create or the byte-size cap
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub sealed: bool,
}

impl SitemapInfo {
    /// A fresh, empty record stamped with the current time.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            url_count: 0,
            last_modified: Utc::now(),
            sealed: false,
        }
    }

    /// Whether this sitemap accepts no more entries.
    pub fn is_full(&self, capacity: usize) -> bool {
        self.sealed || self.url_count >= capacity
    }
}

/// The persisted sitemap database.
///
/// Invariants kept by the writers in `storage`:
/// - the sum of `url_count` over `sitemaps` equals `url_hashes.len()`
/// - at most one sitemap is not full, and it is `current_sitemap`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    /// Sitemaps in creation order
    #[serde(default)]
    pub sitemaps: Vec<SitemapInfo>,

    /// Hex SHA-256 of every accepted URL
    #[serde(default, with = "hash_set")]
    pub url_hashes: BTreeSet<String>,

    /// Sitemap currently accepting entries; empty before the first one
    #[serde(default)]
    pub current_sitemap: String,

    /// Refreshed on every save
    pub last_updated: DateTime<Utc>,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            sitemaps: Vec::new(),
            url_hashes: BTreeSet::new(),
            current_sitemap: String::new(),
            last_updated: Utc::now(),
        }
    }
}

impl Store {
    /// Whether a URL hash was already accepted.
    pub fn contains(&self, hash: &str) -> bool {
        self.url_hashes.contains(hash)
    }

    /// Total accepted URLs.
    pub fn url_count(&self) -> usize {
        self.url_hashes.len()
    }

    /// Metadata for a sitemap by file name.
    pub fn sitemap(&self, filename: &str) -> Option<&SitemapInfo> {
        self.sitemaps.iter().find(|s| s.filename == filename)
    }

    /// Mutable metadata for a sitemap by file name.
    pub fn sitemap_mut(&mut self, filename: &str) -> Option<&mut SitemapInfo> {
        self.sitemaps.iter_mut().find(|s| s.filename == filename)
    }

    /// Metadata for the current sitemap, if one is designated.
    pub fn current(&self) -> Option<&SitemapInfo> {
        if self.current_sitemap.is_empty() {
            return None;
        }
        self.sitemap(&self.current_sitemap)
    }

    /// Check both bookkeeping invariants.
    pub fn check_invariants(&self, capacity: usize) -> std::result::Result<(), String> {
        let counted: usize = self.sitemaps.iter().map(|s| s.url_count).sum();
        if counted != self.url_hashes.len() {
            return Err(format!(
                "sitemaps hold {} entries but {} hashes are recorded",
                counted,
                self.url_hashes.len()
            ));
        }

        let open: Vec<&str> = self
            .sitemaps
            .iter()
            .filter(|s| !s.is_full(capacity))
            .map(|s| s.filename.as_str())
            .collect();
        match open.as_slice() {
            [] => Ok(()),
            [name] if *name == self.current_sitemap => Ok(()),
            [name] => Err(format!(
                "open sitemap {name} is not the current sitemap ({})",
                self.current_sitemap
            )),
            names => Err(format!("more than one open sitemap: {}", names.join(", "))),
        }
    }
}

/// `url_hashes` is a JSON object of `hash -> true`.
mod hash_set {
    use std::collections::{BTreeMap, BTreeSet};

    use serde::{Deserialize, Deserializer, Serializer, ser::SerializeMap};

    pub fn serialize<S: Serializer>(
        hashes: &BTreeSet<String>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(hashes.len()))?;
        for hash in hashes {
            map.serialize_entry(hash, &true)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeSet<String>, D::Error> {
        let map: Option<BTreeMap<String, bool>> = Option::deserialize(deserializer)?;
        Ok(map
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(hash, seen)| seen.then_some(hash))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(name: &str, count: usize) -> SitemapInfo {
        SitemapInfo {
            url_count: count,
            ..SitemapInfo::new(name)
        }
    }

    #[test]
    fn test_hashes_serialize_as_object_of_true() {
        let mut store = Store::default();
        store.url_hashes.insert("abc".to_string());
        let value = serde_json::to_value(&store).unwrap();
        assert_eq!(value["url_hashes"], serde_json::json!({ "abc": true }));
        assert_eq!(value["current_sitemap"], "");
        assert!(value["sitemaps"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_false_and_null_hashes_load_as_unseen() {
        let json = r#"{
            "sitemaps": [],
            "url_hashes": { "aaa": true, "bbb": false },
            "current_sitemap": "",
            "last_updated": "2026-01-01T00:00:00Z"
        }"#;
        let store: Store = serde_json::from_str(json).unwrap();
        assert!(store.contains("aaa"));
        assert!(!store.contains("bbb"));

        let json = r#"{ "sitemaps": null, "url_hashes": null, "last_updated": "2026-01-01T00:00:00Z" }"#;
        assert!(serde_json::from_str::<Store>(json).is_err());

        let json = r#"{ "url_hashes": null, "last_updated": "2026-01-01T00:00:00Z" }"#;
        let store: Store = serde_json::from_str(json).unwrap();
        assert_eq!(store.url_count(), 0);
    }

    #[test]
    fn test_sealed_flag_only_written_when_set() {
        let open = serde_json::to_value(info("sitemap_1.xml", 3)).unwrap();
        assert!(open.get("sealed").is_none());

        let mut sealed = info("sitemap_1.xml", 3);
        sealed.sealed = true;
        let value = serde_json::to_value(&sealed).unwrap();
        assert_eq!(value["sealed"], true);
    }

    #[test]
    fn test_is_full() {
        assert!(!info("a.xml", 2).is_full(3));
        assert!(info("a.xml", 3).is_full(3));
        let mut sealed = info("a.xml", 0);
        sealed.sealed = true;
        assert!(sealed.is_full(3));
    }

    #[test]
    fn test_invariants() {
        let mut store = Store::default();
        store.sitemaps = vec![info("s_1.xml", 2), info("s_2.xml", 1)];
        store.current_sitemap = "s_2.xml".to_string();
        for h in ["a", "b", "c"] {
            store.url_hashes.insert(h.to_string());
        }
        assert!(store.check_invariants(2).is_ok());

        // first sitemap not full any more
        assert!(store.check_invariants(3).is_err());

        store.url_hashes.remove("c");
        assert!(store.check_invariants(2).is_err());
    }
}
