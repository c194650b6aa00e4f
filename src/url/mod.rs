//! URL handling module for Novel-Ingest
//!
//! This module derives novel identities from landing page URLs and builds
//! chapter URLs from the site's chapter URL template.

mod normalize;

pub use normalize::normalize_url;

use crate::UrlError;
use url::Url;

/// Builds the URL of chapter `number` for a novel
///
/// `template` carries a `{base}` placeholder, replaced by the chapter list
/// location with any trailing slash removed, and a `{number}` placeholder.
/// The same inputs always produce the same URL.
///
/// # Examples
///
/// ```
/// use novel_ingest::url::chapter_url;
///
/// let url = chapter_url("{base}/chapter-{number}", "https://example.com/book/abc/", 12).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/book/abc/chapter-12");
/// ```
pub fn chapter_url(template: &str, base: &str, number: u32) -> Result<Url, UrlError> {
    let base = base.trim().trim_end_matches('/');
    let rendered = template
        .replace("{base}", base)
        .replace("{number}", &number.to_string());

    let url = Url::parse(&rendered).map_err(|e| UrlError::Parse(format!("{}: {}", rendered, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    Ok(url)
}
