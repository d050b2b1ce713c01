//! Application configuration structures.

use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AppError, Result};
use crate::models::sitemap::{ChangeFreq, MAX_URLS_PER_SITEMAP, validate_priority};

/// Root application configuration, stored as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding sitemaps, the index, and the database
    #[serde(default = "defaults::output_dir")]
    pub output_dir: PathBuf,

    /// Public URL the sitemap files are served under
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// File stem for sitemap files (`{prefix}_{n}.xml`)
    #[serde(default = "defaults::sitemap_prefix")]
    pub sitemap_prefix: String,

    /// Ping search engines after every successful add
    #[serde(default)]
    pub ping_on_update: bool,

    /// Ping URL prefixes; the index URL is appended to each
    #[serde(default = "defaults::ping_engines")]
    pub ping_engines: Vec<String>,

    /// Change frequency used when `add` gets none
    #[serde(
        default = "defaults::changefreq",
        deserialize_with = "deserialize_changefreq"
    )]
    pub default_changefreq: Option<ChangeFreq>,

    /// Priority used when `add` gets none
    #[serde(default = "defaults::priority")]
    pub default_priority: f64,

    /// Reject URLs matching robots.txt `Disallow` rules
    #[serde(default = "defaults::enabled")]
    pub respect_robots: bool,

    /// Reserved for version-control aware filtering; not consulted
    #[serde(default = "defaults::enabled")]
    pub vcs_aware: bool,

    /// Location of the robots.txt whose rules are enforced
    #[serde(default = "defaults::robots_path")]
    pub robots_path: PathBuf,

    /// Look for a newer release in the background
    #[serde(default = "defaults::enabled")]
    pub check_updates: bool,

    /// Entries per sitemap before rolling over (at most 50,000)
    #[serde(default = "defaults::max_urls")]
    pub max_urls_per_sitemap: usize,

    /// Timeout for every outbound HTTP request
    #[serde(default = "defaults::http_timeout")]
    pub http_timeout_secs: u64,

    /// User-Agent header for outbound HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: defaults::output_dir(),
            base_url: defaults::base_url(),
            sitemap_prefix: defaults::sitemap_prefix(),
            ping_on_update: false,
            ping_engines: defaults::ping_engines(),
            default_changefreq: defaults::changefreq(),
            default_priority: defaults::priority(),
            respect_robots: true,
            vcs_aware: true,
            robots_path: defaults::robots_path(),
            check_updates: true,
            max_urls_per_sitemap: defaults::max_urls(),
            http_timeout_secs: defaults::http_timeout(),
            user_agent: defaults::user_agent(),
        }
    }
}

/// Parses a string and stores it into one config field.
type Setter = fn(&mut Config, &str) -> std::result::Result<(), String>;

/// Every key `config <key> <value>` accepts, with its parser.
const SETTERS: &[(&str, Setter)] = &[
    ("output_dir", |c, v| {
        c.output_dir = PathBuf::from(v);
        Ok(())
    }),
    ("base_url", |c, v| {
        c.base_url = v.trim().to_string();
        Ok(())
    }),
    ("sitemap_prefix", |c, v| {
        c.sitemap_prefix = v.trim().to_string();
        Ok(())
    }),
    ("ping_on_update", |c, v| {
        c.ping_on_update = parse_bool(v)?;
        Ok(())
    }),
    ("ping_engines", |c, v| {
        c.ping_engines = parse_list(v);
        Ok(())
    }),
    ("default_changefreq", |c, v| {
        c.default_changefreq = parse_changefreq(v)?;
        Ok(())
    }),
    ("default_priority", |c, v| {
        c.default_priority = parse_priority(v)?;
        Ok(())
    }),
    ("respect_robots", |c, v| {
        c.respect_robots = parse_bool(v)?;
        Ok(())
    }),
    ("vcs_aware", |c, v| {
        c.vcs_aware = parse_bool(v)?;
        Ok(())
    }),
    ("robots_path", |c, v| {
        c.robots_path = PathBuf::from(v);
        Ok(())
    }),
    ("check_updates", |c, v| {
        c.check_updates = parse_bool(v)?;
        Ok(())
    }),
    ("max_urls_per_sitemap", |c, v| {
        c.max_urls_per_sitemap = v
            .trim()
            .parse()
            .map_err(|e| format!("expected a whole number: {e}"))?;
        Ok(())
    }),
    ("http_timeout_secs", |c, v| {
        c.http_timeout_secs = v
            .trim()
            .parse()
            .map_err(|e| format!("expected a whole number of seconds: {e}"))?;
        Ok(())
    }),
    ("user_agent", |c, v| {
        c.user_agent = v.to_string();
        Ok(())
    }),
];

fn parse_bool(value: &str) -> std::result::Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err("expected true or false".to_string()),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_changefreq(value: &str) -> std::result::Result<Option<ChangeFreq>, String> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    value.parse().map(Some).map_err(|e: AppError| e.to_string())
}

/// Accepts `null`, `""` and `"none"` as no default, like the setter does.
fn deserialize_changefreq<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<ChangeFreq>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(value) => parse_changefreq(&value).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn parse_priority(value: &str) -> std::result::Result<f64, String> {
    let priority: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("expected a number: {e}"))?;
    validate_priority(priority).map_err(|e| e.to_string())
}

impl Config {
    /// Keys accepted by [`Config::set`], in display order.
    pub fn keys() -> impl Iterator<Item = &'static str> {
        SETTERS.iter().map(|(key, _)| *key)
    }

    /// Parse `value` with the key's typed setter.
    ///
    /// The change is applied only if the resulting config still validates.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let setter = SETTERS
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, setter)| setter)
            .ok_or_else(|| AppError::UnknownConfigKey(key.to_string()))?;

        let mut updated = self.clone();
        setter(&mut updated, value).map_err(|e| AppError::invalid_value(key, value, e))?;
        updated
            .validate()
            .map_err(|e| AppError::invalid_value(key, value, e))?;

        *self = updated;
        Ok(())
    }

    /// Current value of one key, as JSON.
    pub fn get(&self, key: &str) -> Result<serde_json::Value> {
        if !Self::keys().any(|k| k == key) {
            return Err(AppError::UnknownConfigKey(key.to_string()));
        }
        let value = serde_json::to_value(self)?;
        Ok(value.get(key).cloned().unwrap_or(serde_json::Value::Null))
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(AppError::validation("output_dir is empty"));
        }
        match url::Url::parse(&self.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(AppError::validation(format!(
                    "base_url must be http or https, got {}",
                    url.scheme()
                )));
            }
            Err(e) => {
                return Err(AppError::validation(format!(
                    "base_url '{}' is not a valid URL: {e}",
                    self.base_url
                )));
            }
        }
        if self.sitemap_prefix.is_empty() {
            return Err(AppError::validation("sitemap_prefix is empty"));
        }
        if self.sitemap_prefix.contains(['/', '\\']) {
            return Err(AppError::validation(
                "sitemap_prefix must not contain path separators",
            ));
        }
        validate_priority(self.default_priority)?;
        if !(1..=MAX_URLS_PER_SITEMAP).contains(&self.max_urls_per_sitemap) {
            return Err(AppError::validation(format!(
                "max_urls_per_sitemap must be between 1 and {MAX_URLS_PER_SITEMAP}"
            )));
        }
        if self.http_timeout_secs == 0 {
            return Err(AppError::validation("http_timeout_secs must be > 0"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(AppError::validation("user_agent is empty"));
        }
        Ok(())
    }

    /// Public URL of the sitemap index.
    pub fn index_url(&self) -> String {
        crate::utils::url::join(&self.base_url, crate::storage::INDEX_FILE)
    }
}

mod defaults {
    use std::path::PathBuf;

    use super::ChangeFreq;
    use crate::models::sitemap::MAX_URLS_PER_SITEMAP;

    pub fn output_dir() -> PathBuf {
        PathBuf::from("./sitemaps")
    }
    pub fn base_url() -> String {
        "https://example.com".into()
    }
    pub fn sitemap_prefix() -> String {
        "sitemap".into()
    }
    pub fn ping_engines() -> Vec<String> {
        vec![
            "https://www.google.com/ping?sitemap=".into(),
            "https://www.bing.com/ping?sitemap=".into(),
        ]
    }
    pub fn changefreq() -> Option<ChangeFreq> {
        Some(ChangeFreq::Weekly)
    }
    pub fn priority() -> f64 {
        0.5
    }
    pub fn enabled() -> bool {
        true
    }
    pub fn robots_path() -> PathBuf {
        PathBuf::from("./robots.txt")
    }
    pub fn max_urls() -> usize {
        MAX_URLS_PER_SITEMAP
    }
    pub fn http_timeout() -> u64 {
        10
    }
    pub fn user_agent() -> String {
        format!("sitemaptool/{}", env!("CARGO_PKG_VERSION"))
    }
}
