//! Sitemap document entries.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Namespace carried by both `urlset` and `sitemapindex` roots.
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Date format used by `lastmod` elements.
pub const LASTMOD_FORMAT: &str = "%Y-%m-%d";

/// Protocol limit on `<url>` entries per sitemap file.
pub const MAX_URLS_PER_SITEMAP: usize = 50_000;

/// Protocol limit on the uncompressed size of one sitemap file.
pub const MAX_SITEMAP_BYTES: usize = 50 * 1024 * 1024;

/// How often a page is expected to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFreq {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFreq {
    /// All variants, in protocol order.
    pub const ALL: [ChangeFreq; 7] = [
        ChangeFreq::Always,
        ChangeFreq::Hourly,
        ChangeFreq::Daily,
        ChangeFreq::Weekly,
        ChangeFreq::Monthly,
        ChangeFreq::Yearly,
        ChangeFreq::Never,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeFreq::Always => "always",
            ChangeFreq::Hourly => "hourly",
            ChangeFreq::Daily => "daily",
            ChangeFreq::Weekly => "weekly",
            ChangeFreq::Monthly => "monthly",
            ChangeFreq::Yearly => "yearly",
            ChangeFreq::Never => "never",
        }
    }
}

impl fmt::Display for ChangeFreq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeFreq {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|freq| freq.as_str() == wanted)
            .ok_or_else(|| {
                AppError::validation(format!(
                    "invalid changefreq '{s}' (expected one of always, hourly, daily, weekly, monthly, yearly, never)"
                ))
            })
    }
}

/// Check that a priority lies in `[0, 1]`.
pub fn validate_priority(priority: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&priority) {
        Ok(priority)
    } else {
        Err(AppError::validation(format!(
            "priority {priority} is outside 0.0..=1.0"
        )))
    }
}

/// One `<url>` element of a sitemap.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlEntry {
    /// Page location, stored verbatim
    pub loc: String,

    /// Date of last modification
    pub lastmod: Option<NaiveDate>,

    /// Expected change frequency
    pub changefreq: Option<ChangeFreq>,

    /// Relative priority in `[0, 1]`
    pub priority: Option<f64>,
}

impl UrlEntry {
    /// Create an entry with only a location.
    pub fn new(loc: impl Into<String>) -> Self {
        Self {
            loc: loc.into(),
            lastmod: None,
            changefreq: None,
            priority: None,
        }
    }
}

/// One `<sitemap>` element of the sitemap index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Public URL of the sitemap file
    pub loc: String,

    /// Date the sitemap last changed
    pub lastmod: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changefreq_parse() {
        assert_eq!("weekly".parse::<ChangeFreq>().unwrap(), ChangeFreq::Weekly);
        assert_eq!(" Daily ".parse::<ChangeFreq>().unwrap(), ChangeFreq::Daily);
        assert!("fortnightly".parse::<ChangeFreq>().is_err());
    }

    #[test]
    fn test_changefreq_serde_lowercase() {
        let json = serde_json::to_string(&ChangeFreq::Monthly).unwrap();
        assert_eq!(json, "\"monthly\"");
        let back: ChangeFreq = serde_json::from_str("\"never\"").unwrap();
        assert_eq!(back, ChangeFreq::Never);
    }

    #[test]
    fn test_priority_bounds() {
        assert!(validate_priority(0.0).is_ok());
        assert!(validate_priority(1.0).is_ok());
        assert!(validate_priority(1.5).is_err());
        assert!(validate_priority(-0.1).is_err());
        assert!(validate_priority(f64::NAN).is_err());
    }
}
