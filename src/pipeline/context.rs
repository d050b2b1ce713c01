// src/pipeline/context.rs

//! Per-command state shared by every pipeline operation.

use crate::error::{AppError, Result};
use crate::models::{Config, Store};
use crate::services::{RobotsRules, UrlFilter};
use crate::storage::{FileLock, IndexGenerator, Layout, PartitionWriter, StoreFile};

/// Everything one command needs, built once from the config.
///
/// Nothing here is global: tests and concurrent callers each build their own.
#[derive(Debug, Clone)]
pub struct SitemapContext {
    config: Config,
    layout: Layout,
    filter: UrlFilter,
    writer: PartitionWriter,
    index: IndexGenerator,
    store_file: StoreFile,
}

impl SitemapContext {
    /// Validate the config and load robots.txt rules if they are respected.
    pub fn new(config: Config) -> Result<Self> {
        let rules = if config.respect_robots {
            RobotsRules::load(&config.robots_path)?
        } else {
            RobotsRules::default()
        };
        Self::with_rules(config, rules)
    }

    /// Like [`SitemapContext::new`] with rules supplied by the caller.
    pub fn with_rules(config: Config, rules: RobotsRules) -> Result<Self> {
        config.validate()?;

        let layout = Layout::new(&config.output_dir);
        let filter = UrlFilter::new(rules, config.respect_robots);
        let writer = PartitionWriter::new(
            layout.clone(),
            &config.sitemap_prefix,
            config.max_urls_per_sitemap,
        );
        let index = IndexGenerator::new(layout.clone(), &config.base_url);
        let store_file = StoreFile::new(layout.db_path());

        Ok(Self {
            config,
            layout,
            filter,
            writer,
            index,
            store_file,
        })
    }

    /// Replace the partition writer, e.g. to lower the size cap.
    pub fn with_writer(mut self, writer: PartitionWriter) -> Self {
        self.writer = writer;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn filter(&self) -> &UrlFilter {
        &self.filter
    }

    pub fn writer(&self) -> &PartitionWriter {
        &self.writer
    }

    pub fn index(&self) -> &IndexGenerator {
        &self.index
    }

    /// Lock the output directory for a read-modify-write cycle and load the store.
    ///
    /// Blocks until no other process holds the lock.
    pub fn write_session(&self) -> Result<Session<'_>> {
        let lock_path = self.layout.lock_path();
        log::debug!("Waiting for exclusive lock on {}", lock_path.display());
        let lock = FileLock::exclusive(&lock_path)
            .map_err(|e| AppError::store(&lock_path, format!("locking: {e}")))?;
        let store = self.store_file.load()?;
        Ok(Session {
            ctx: self,
            store,
            _lock: lock,
        })
    }

    /// Read the store under a shared lock; released before returning.
    ///
    /// Never writes: a missing database reads as empty.
    pub fn read_store(&self) -> Result<Store> {
        let lock_path = self.layout.lock_path();
        let _lock = FileLock::shared(&lock_path)
            .map_err(|e| AppError::store(&lock_path, format!("locking: {e}")))?;
        self.store_file.read()
    }
}

/// A loaded store plus the exclusive lock that guards it.
///
/// Dropping the session without [`Session::commit`] releases the lock and
/// discards in-memory changes.
#[derive(Debug)]
pub struct Session<'a> {
    ctx: &'a SitemapContext,
    pub store: Store,
    _lock: FileLock,
}

impl Session<'_> {
    /// Persist the store, then rebuild the index from it.
    pub fn commit(mut self) -> Result<Store> {
        self.ctx.store_file.save(&mut self.store)?;
        self.ctx.index.regenerate(&self.store)?;
        Ok(self.store)
    }
}
