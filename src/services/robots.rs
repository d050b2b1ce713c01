// src/services/robots.rs

//! robots.txt `Disallow` rules.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::utils::url::request_path;

/// User agents whose groups apply to this tool.
const AGENTS: [&str; 2] = ["*", "sitemaptool"];

/// Disallowed path prefixes collected from robots.txt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsRules {
    prefixes: BTreeSet<String>,
}

impl RobotsRules {
    /// Read rules from `path`. A missing file yields no rules.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => {
                let rules = Self::parse(&content);
                log::debug!(
                    "Loaded {} disallow rules from {}",
                    rules.len(),
                    path.display()
                );
                Ok(rules)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No robots.txt at {}, no rules applied", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(AppError::config(path, format!("reading robots.txt: {e}"))),
        }
    }

    /// Collect `Disallow` values from groups addressed to `*` or `sitemaptool`.
    ///
    /// Directive names are case-insensitive; values keep their case. Empty
    /// `Disallow:` lines allow everything and are skipped.
    pub fn parse(content: &str) -> Self {
        let mut prefixes = BTreeSet::new();
        let mut applies = false;

        for line in content.lines() {
            let line = line.trim();
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();

            if name.trim().eq_ignore_ascii_case("user-agent") {
                let agent = value.to_ascii_lowercase();
                applies = AGENTS.contains(&agent.as_str());
            } else if applies && name.trim().eq_ignore_ascii_case("disallow") && !value.is_empty() {
                prefixes.insert(value.to_string());
            }
        }

        Self { prefixes }
    }

    pub fn from_prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// First rule that is a prefix of the URL string or of its path.
    pub fn disallowing(&self, url: &str) -> Option<&str> {
        let path = request_path(url);
        self.prefixes
            .iter()
            .find(|prefix| {
                url.starts_with(prefix.as_str())
                    || path.as_deref().is_some_and(|p| p.starts_with(prefix.as_str()))
            })
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ROBOTS: &str = "\
# comment line
User-agent: Googlebot
Disallow: /google-only

user-agent: *
Disallow: /private
DISALLOW: /tmp/
Disallow:

User-agent: sitemaptool
Disallow: /drafts
";

    #[test]
    fn test_parse_keeps_matching_groups_only() {
        let rules = RobotsRules::parse(ROBOTS);
        assert_eq!(
            rules,
            RobotsRules::from_prefixes(["/private", "/tmp/", "/drafts"])
        );
    }

    #[test]
    fn test_disallowing_matches_path_of_absolute_url() {
        let rules = RobotsRules::from_prefixes(["/private"]);
        assert_eq!(
            rules.disallowing("https://example.com/private/page"),
            Some("/private")
        );
        assert_eq!(rules.disallowing("https://example.com/public/page"), None);
        assert_eq!(rules.disallowing("/private/raw"), Some("/private"));
    }

    #[test]
    fn test_disallowing_matches_full_url_prefix() {
        let rules = RobotsRules::from_prefixes(["https://example.com/beta"]);
        assert!(rules.disallowing("https://example.com/beta/x").is_some());
        assert!(rules.disallowing("https://other.com/beta/x").is_none());
    }

    #[test]
    fn test_query_is_part_of_the_path() {
        let rules = RobotsRules::from_prefixes(["/search?q="]);
        assert!(rules.disallowing("https://example.com/search?q=rust").is_some());
        assert!(rules.disallowing("https://example.com/search").is_none());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let rules = RobotsRules::load(tmp.path().join("robots.txt")).unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn test_load_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("robots.txt");
        fs::write(&path, ROBOTS).unwrap();
        assert_eq!(RobotsRules::load(&path).unwrap().len(), 3);
    }
}
