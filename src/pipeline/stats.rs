// src/pipeline/stats.rs

//! Read-only summary of the sitemap database.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::SitemapInfo;
use crate::pipeline::SitemapContext;

/// Snapshot of the database for reporting.
#[derive(Debug, Clone)]
pub struct Stats {
    pub total_urls: usize,
    pub output_dir: PathBuf,
    pub current_sitemap: Option<String>,
    pub last_updated: DateTime<Utc>,
    pub sitemaps: Vec<SitemapInfo>,
}

impl Stats {
    pub fn total_sitemaps(&self) -> usize {
        self.sitemaps.len()
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sitemap Statistics")?;
        writeln!(f, "==================")?;
        writeln!(f, "Total Sitemaps: {}", self.total_sitemaps())?;
        writeln!(f, "Total URLs: {}", self.total_urls)?;
        writeln!(f, "Output Directory: {}", self.output_dir.display())?;
        writeln!(
            f,
            "Current Sitemap: {}",
            self.current_sitemap.as_deref().unwrap_or("(none)")
        )?;
        writeln!(
            f,
            "Last Updated: {}",
            self.last_updated.format("%Y-%m-%d %H:%M:%S UTC")
        )?;

        if !self.sitemaps.is_empty() {
            writeln!(f)?;
            writeln!(f, "Sitemaps:")?;
        }
        for info in &self.sitemaps {
            write!(
                f,
                "  - {}: {} URLs (last modified: {})",
                info.filename,
                info.url_count,
                info.last_modified.format("%Y-%m-%d %H:%M:%S")
            )?;
            if info.sealed {
                write!(f, " [sealed]")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Collect [`Stats`] under a shared lock.
pub fn run_stats(ctx: &SitemapContext) -> Result<Stats> {
    let store = ctx.read_store()?;
    Ok(Stats {
        total_urls: store.url_count(),
        output_dir: ctx.layout().root().to_path_buf(),
        current_sitemap: store.current().map(|s| s.filename.clone()),
        last_updated: store.last_updated,
        sitemaps: store.sitemaps,
    })
}
