// src/lib.rs

//! sitemaptool Library
//!
//! Keeps a website's URLs in capped, append-only XML sitemaps with a
//! regenerated sitemap index, deduplicating by URL hash and honoring
//! robots.txt rules.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
