// src/pipeline/ping.rs

//! Notifying search engines about the sitemap index.

use std::sync::Arc;

use crate::error::Result;
use crate::pipeline::SitemapContext;
use crate::services::notify::{ping_all, spawn_ping};
use crate::services::{HttpNotifier, Notifier, PingReport};
use crate::utils::http;

/// HTTP notifier bounded by the configured timeout.
pub fn http_notifier(ctx: &SitemapContext) -> Result<Arc<dyn Notifier>> {
    let client = http::create_client(ctx.config())?;
    Ok(Arc::new(HttpNotifier::new(client)))
}

/// Ping every configured engine and wait for all of them.
pub async fn run_ping(ctx: &SitemapContext, notifier: &dyn Notifier) -> PingReport {
    let config = ctx.config();
    let index_url = config.index_url();
    log::info!(
        "Pinging {} search engines with {}",
        config.ping_engines.len(),
        index_url
    );
    ping_all(notifier, &config.ping_engines, &index_url).await
}

/// Fire-and-forget ping after a successful add, if `ping_on_update` is set.
///
/// Returns whether a ping was started.
pub fn ping_after_update(ctx: &SitemapContext, notifier: Arc<dyn Notifier>) -> bool {
    let config = ctx.config();
    if !config.ping_on_update || config.ping_engines.is_empty() {
        return false;
    }
    spawn_ping(notifier, config.ping_engines.clone(), config.index_url());
    true
}
