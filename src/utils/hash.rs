// src/utils/hash.rs

//! Content hashing for duplicate detection.

use sha2::{Digest, Sha256};

/// Length of a hex-encoded URL hash.
pub const HASH_HEX_LEN: usize = 64;

/// SHA-256 of the exact URL string, hex-encoded.
///
/// No normalization happens here: `https://example.com/a` and
/// `https://example.com/a/` hash differently.
pub fn hash_url(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}
