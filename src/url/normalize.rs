use crate::UrlError;
use url::Url;

/// Query parameters that never change which novel a URL points at
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "ref", "source", "from"];

/// Normalizes a novel URL into its stable identity form
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or not HTTP(S)
/// 2. Lowercase the host and drop a leading `www.`
/// 3. Collapse empty segments and trailing slashes in the path
/// 4. Remove the fragment
/// 5. Remove tracking parameters and sort the rest
///
/// The result is only used as a key. Pages are always fetched from the URL
/// exactly as configured.
///
/// # Examples
///
/// ```
/// use novel_ingest::url::normalize_url;
///
/// let url = normalize_url("https://WWW.Novels.example.com/book/abc/#comments").unwrap();
/// assert_eq!(url.as_str(), "https://novels.example.com/book/abc");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let host = url.host_str().ok_or(UrlError::MissingDomain)?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Malformed(format!("Failed to set host: {}", e)))?;

    let path = normalize_path(url.path());
    url.set_path(&path);

    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            let query_string = params
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&");
            url.set_query(Some(&query_string));
        }
    }

    Ok(url)
}

/// Drops empty segments and the trailing slash (root stays `/`)
fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();

    format!("/{}", segments.join("/"))
}

fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort_by(|a, b| a.0.cmp(&b.0));
    params
}

fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_is_preserved() {
        let result = normalize_url("http://127.0.0.1:8080/novel/abc").unwrap();
        assert_eq!(result.as_str(), "http://127.0.0.1:8080/novel/abc");
    }

    #[test]
    fn test_remove_www_and_lowercase() {
        let result = normalize_url("https://WWW.Example.com/Book/Title").unwrap();
        assert_eq!(result.as_str(), "https://example.com/Book/Title");
    }

    #[test]
    fn test_remove_trailing_slash_and_fragment() {
        let result = normalize_url("https://example.com/book/abc/#chapters").unwrap();
        assert_eq!(result.as_str(), "https://example.com/book/abc");
    }

    #[test]
    fn test_keep_root_slash() {
        let result = normalize_url("https://example.com").unwrap();
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_tracking_params_removed_and_sorted() {
        let result =
            normalize_url("https://example.com/book?utm_source=x&page=2&fbclid=y&lang=en").unwrap();
        assert_eq!(result.as_str(), "https://example.com/book?lang=en&page=2");
    }

    #[test]
    fn test_multiple_slashes() {
        let result = normalize_url("https://example.com///book//abc").unwrap();
        assert_eq!(result.as_str(), "https://example.com/book/abc");
    }

    #[test]
    fn test_invalid_scheme() {
        let result = normalize_url("ftp://example.com/book");
        assert!(matches!(result.unwrap_err(), UrlError::InvalidScheme(_)));
    }

    #[test]
    fn test_malformed_url() {
        assert!(matches!(
            normalize_url("not a url").unwrap_err(),
            UrlError::Parse(_)
        ));
    }
}
