//! Utility functions and helpers.

pub mod hash;
pub mod http;
pub mod url;

pub use hash::hash_url;
