// src/services/updates.rs

//! Release check against GitHub.

use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, Result};

/// Repository whose releases are checked.
pub const GITHUB_REPO: &str = "abraham-ny/sitemaptool";

/// Version of this build.
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Deserialize)]
struct Release {
    #[serde(default)]
    tag_name: String,
}

/// What the latest release looks like relative to this build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatus {
    pub current: String,
    pub latest: String,
    pub newer_available: bool,
    pub download_url: String,
}

/// Queries the latest-release endpoint.
#[derive(Debug, Clone)]
pub struct UpdateChecker {
    client: Client,
    api_url: String,
}

impl UpdateChecker {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            api_url: format!("https://api.github.com/repos/{GITHUB_REPO}/releases/latest"),
        }
    }

    /// Point at a different releases endpoint.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn download_url() -> String {
        format!("https://github.com/{GITHUB_REPO}/releases")
    }

    /// Fetch the latest release tag and compare it with [`CURRENT_VERSION`].
    pub async fn check(&self) -> Result<UpdateStatus> {
        let response = self
            .client
            .get(&self.api_url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| AppError::network(format!("release check failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::network(format!("release check failed: {e}")))?;

        let body = response
            .text()
            .await
            .map_err(|e| AppError::network(format!("reading release info: {e}")))?;
        let release: Release = serde_json::from_str(&body)
            .map_err(|e| AppError::network(format!("unexpected release info: {e}")))?;

        Ok(UpdateStatus {
            newer_available: is_newer(&release.tag_name, CURRENT_VERSION),
            current: CURRENT_VERSION.to_string(),
            latest: release.tag_name,
            download_url: Self::download_url(),
        })
    }
}

/// Numeric components of a version tag, ignoring a leading `v` and any
/// pre-release or build suffix.
fn version_parts(tag: &str) -> Option<Vec<u64>> {
    let core = tag.trim().trim_start_matches(['v', 'V']);
    let core = core.split(['-', '+']).next().unwrap_or_default();
    if core.is_empty() {
        return None;
    }
    core.split('.').map(|part| part.parse().ok()).collect()
}

/// Whether `latest` is a newer release than `current`.
///
/// Tags that are not dotted numbers count as newer whenever they differ.
pub fn is_newer(latest: &str, current: &str) -> bool {
    if latest.trim().is_empty() {
        return false;
    }
    match (version_parts(latest), version_parts(current)) {
        (Some(mut latest), Some(mut current)) => {
            let len = latest.len().max(current.len());
            latest.resize(len, 0);
            current.resize(len, 0);
            latest > current
        }
        _ => latest.trim_start_matches(['v', 'V']) != current.trim_start_matches(['v', 'V']),
    }
}

/// Run a release check on a detached task, logging a notice if one is found.
///
/// Failures are logged at debug level only. Must be called inside a Tokio
/// runtime.
pub fn spawn_check(checker: UpdateChecker) {
    tokio::spawn(async move {
        match checker.check().await {
            Ok(status) if status.newer_available => log::info!(
                "New version available: {} (current: {}). Download from {}",
                status.latest,
                status.current,
                status.download_url
            ),
            Ok(_) => log::debug!("sitemaptool is up to date"),
            Err(e) => log::debug!("Update check skipped: {e}"),
        }
    });
}
