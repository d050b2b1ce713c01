//! Service layer for the sitemap tool.
//!
//! - robots.txt rules (`RobotsRules`)
//! - duplicate and policy filtering (`UrlFilter`)
//! - search-engine pings (`Notifier`, `HttpNotifier`)
//! - release checks (`UpdateChecker`)

mod filter;
pub mod notify;
mod robots;
pub mod updates;

pub use filter::{Rejection, UrlFilter, Verdict};
pub use notify::{HttpNotifier, Notifier, PingReport};
pub use robots::RobotsRules;
pub use updates::{UpdateChecker, UpdateStatus};
