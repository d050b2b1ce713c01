//! Pipeline entry points, one per command.
//!
//! - `run_add`: Filter a URL and place it in the current sitemap
//! - `run_create`: Seal the current sitemap and start a new one
//! - `run_stats`: Summarize the database
//! - `run_ping`: Notify search engines about the index

pub mod add;
mod context;
pub mod create;
pub mod ping;
pub mod stats;

pub use add::{AddOutcome, AddRequest, run_add};
pub use context::{Session, SitemapContext};
pub use create::run_create;
pub use ping::{http_notifier, ping_after_update, run_ping};
pub use stats::{Stats, run_stats};
