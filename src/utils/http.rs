// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::Result;
use crate::models::Config;

/// Create an HTTP client bounded by the configured timeout.
///
/// Every outbound call (ping, version check) goes through a client built here,
/// so no network request can stall a command indefinitely.
pub fn create_client(config: &Config) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .connect_timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;
    Ok(client)
}
