// src/pipeline/create.rs

//! Explicitly starting a new sitemap.

use crate::error::Result;
use crate::pipeline::SitemapContext;

/// Seal the current sitemap and start the next one. Returns its file name.
///
/// The new file is written empty right away so the index never names a
/// missing sitemap.
pub fn run_create(ctx: &SitemapContext) -> Result<String> {
    let mut session = ctx.write_session()?;

    ctx.writer().seal_current(&mut session.store);
    let filename = ctx.writer().create_partition(&mut session.store);
    ctx.writer().save(&filename, &[])?;
    session.commit()?;

    Ok(filename)
}
