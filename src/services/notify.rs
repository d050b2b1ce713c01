// src/services/notify.rs

//! Search-engine notification ("ping") of the sitemap index.
//!
//! Pings are best-effort: every engine is called independently, failures are
//! logged and counted, and nothing is retried.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;

use crate::error::{AppError, Result};

/// Delivers a single ping.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Notify one engine that `index_url` changed.
    async fn notify(&self, engine: &str, index_url: &str) -> Result<()>;
}

/// Pings by issuing `GET {engine}{index_url}`.
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    client: Client,
}

impl HttpNotifier {
    /// Wrap a client; its timeout bounds every ping.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, engine: &str, index_url: &str) -> Result<()> {
        let ping_url = format!("{engine}{index_url}");
        let response = self
            .client
            .get(&ping_url)
            .send()
            .await
            .map_err(|e| AppError::network(format!("{ping_url}: {e}")))?;
        response
            .error_for_status()
            .map_err(|e| AppError::network(format!("{ping_url}: {e}")))?;
        Ok(())
    }
}

/// Result of a ping fan-out.
#[derive(Debug, Default)]
pub struct PingReport {
    pub succeeded: Vec<String>,
    /// `(engine, error message)`
    pub failed: Vec<(String, String)>,
}

impl PingReport {
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Ping every engine concurrently and wait for all of them.
pub async fn ping_all<N>(notifier: &N, engines: &[String], index_url: &str) -> PingReport
where
    N: Notifier + ?Sized,
{
    let results = join_all(engines.iter().map(|engine| async move {
        (engine, notifier.notify(engine, index_url).await)
    }))
    .await;

    let mut report = PingReport::default();
    for (engine, result) in results {
        match result {
            Ok(()) => {
                log::info!("Pinged {engine}");
                report.succeeded.push(engine.clone());
            }
            Err(e) => {
                log::warn!("Failed to ping {engine}: {e}");
                report.failed.push((engine.clone(), e.to_string()));
            }
        }
    }
    report
}

/// Run [`ping_all`] on a detached task.
///
/// The handle is dropped: the caller never waits, and the task dies with the
/// runtime if the process exits first. Must be called inside a Tokio runtime.
pub fn spawn_ping(notifier: Arc<dyn Notifier>, engines: Vec<String>, index_url: String) {
    if engines.is_empty() {
        return;
    }
    log::debug!("Pinging {} engines in the background", engines.len());
    tokio::spawn(async move {
        let report = ping_all(notifier.as_ref(), &engines, &index_url).await;
        log::debug!(
            "Background ping finished: {}/{} succeeded",
            report.succeeded.len(),
            report.attempted()
        );
    });
}
