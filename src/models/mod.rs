// src/models/mod.rs

//! Domain models for the sitemap tool.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
pub mod sitemap;
mod store;

// Re-export all public types
pub use config::Config;
pub use sitemap::{ChangeFreq, IndexEntry, UrlEntry};
pub use store::{SitemapInfo, Store};
