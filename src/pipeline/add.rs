// src/pipeline/add.rs

//! Adding one URL: filter, place, persist, re-index.

use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::sitemap::validate_priority;
use crate::models::{ChangeFreq, UrlEntry};
use crate::pipeline::SitemapContext;

/// A URL to add, with optional per-entry metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct AddRequest {
    pub url: String,
    /// Falls back to `default_changefreq`
    pub changefreq: Option<ChangeFreq>,
    /// Falls back to `default_priority`
    pub priority: Option<f64>,
}

impl AddRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            changefreq: None,
            priority: None,
        }
    }
}

/// Where an added URL ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub url: String,
    pub hash: String,
    /// Sitemap file holding the new entry
    pub sitemap: String,
    /// Entry count of that sitemap after the add
    pub url_count: usize,
}

/// Add one URL to the sitemaps.
///
/// Nothing is written if the URL is rejected. Otherwise the entry is appended
/// to the current sitemap, its hash recorded, the database saved, and the
/// index rebuilt, all under the output directory's exclusive lock.
pub fn run_add(ctx: &SitemapContext, request: AddRequest) -> Result<AddOutcome> {
    let AddRequest {
        url,
        changefreq,
        priority,
    } = request;

    if url.is_empty() {
        return Err(AppError::validation("URL is empty"));
    }
    let priority = validate_priority(priority.unwrap_or(ctx.config().default_priority))?;
    let changefreq = changefreq.or(ctx.config().default_changefreq);

    // robots.txt rules need no store, so refuse before locking
    if let Some(rejection) = ctx.filter().check_policy(&url) {
        return Err(rejection.into_error(&url));
    }

    let mut session = ctx.write_session()?;
    let hash = ctx.filter().accept(&url, &session.store).into_result(&url)?;

    let entry = UrlEntry {
        loc: url.clone(),
        lastmod: Some(Utc::now().date_naive()),
        changefreq,
        priority: Some(priority),
    };
    let placement = ctx.writer().write(&mut session.store, &entry)?;
    session.store.url_hashes.insert(hash.clone());
    session.commit()?;

    log::info!(
        "Added {} to {} ({} entries)",
        url,
        placement.filename,
        placement.url_count
    );
    Ok(AddOutcome {
        url,
        hash,
        sitemap: placement.filename,
        url_count: placement.url_count,
    })
}
