// src/utils/url.rs

//! URL manipulation utilities.

/// Join a base URL and a file name with exactly one slash.
///
/// # Examples
/// ```
/// use sitemaptool::utils::url::join;
///
/// assert_eq!(
///     join("https://example.com/", "sitemap_1.xml"),
///     "https://example.com/sitemap_1.xml"
/// );
/// ```
pub fn join(base: &str, name: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), name)
}

/// Path and query of an absolute URL, as matched by robots.txt rules.
///
/// Returns `None` when the string does not parse as an absolute URL.
pub fn request_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let mut path = parsed.path().to_string();
    if let Some(query) = parsed.query() {
        path.push('?');
        path.push_str(query);
    }
    Some(path)
}
