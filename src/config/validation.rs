use crate::config::types::{
    Config, IngestConfig, NovelTarget, SelectorConfig, SiteConfig, UserAgentConfig,
};
use crate::ingest::compile_selector;
use crate::url::normalize_url;
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Lowest accepted fetch delay; anything faster is impolite to the target site
const MIN_FETCH_DELAY_MS: u64 = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_ingest_config(&config.ingest)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_site_config(&config.site)?;
    validate_selectors(&config.selectors)?;
    validate_novels(&config.novels)?;
    Ok(())
}

/// Validates pacing constants
fn validate_ingest_config(config: &IngestConfig) -> Result<(), ConfigError> {
    if config.fetch_delay_ms < MIN_FETCH_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "fetch-delay-ms must be >= {}ms, got {}ms",
            MIN_FETCH_DELAY_MS, config.fetch_delay_ms
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates the chapter URL template
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    if !config.chapter_url_template.contains("{number}") {
        return Err(ConfigError::Validation(format!(
            "chapter-url-template must contain '{{number}}', got '{}'",
            config.chapter_url_template
        )));
    }

    Ok(())
}

/// Checks that every selector is present and parses
fn validate_selectors(selectors: &SelectorConfig) -> Result<(), ConfigError> {
    let fields = [
        ("title", &selectors.title),
        ("author", &selectors.author),
        ("chapter-count", &selectors.chapter_count),
        ("status", &selectors.status),
        ("genres", &selectors.genres),
        ("summary", &selectors.summary),
        ("chapter-list", &selectors.chapter_list),
        ("chapter-title", &selectors.chapter_title),
        ("chapter-body", &selectors.chapter_body),
    ];

    for (field, css) in fields {
        compile_selector(field, css)?;
    }

    Ok(())
}

/// Validates the novel target list
fn validate_novels(novels: &[NovelTarget]) -> Result<(), ConfigError> {
    if novels.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[novel]] entry is required".to_string(),
        ));
    }

    let mut identities = HashSet::new();
    for novel in novels {
        let identity = normalize_url(&novel.url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid novel URL '{}': {}", novel.url, e))
        })?;

        if !identities.insert(identity.to_string()) {
            return Err(ConfigError::Validation(format!(
                "Novel '{}' is listed more than once",
                novel.url
            )));
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    // Basic email format check: must contain @ and have text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(url: &str) -> NovelTarget {
        NovelTarget {
            url: url.to_string(),
        }
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
    }

    #[test]
    fn test_validate_novels_rejects_duplicates() {
        let novels = vec![
            target("https://novels.example.com/book/a"),
            target("https://NOVELS.example.com/book/a/#reviews"),
        ];
        assert!(matches!(
            validate_novels(&novels),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_novels_rejects_empty_and_bad_urls() {
        assert!(validate_novels(&[]).is_err());
        assert!(matches!(
            validate_novels(&[target("not a url")]),
            Err(ConfigError::InvalidUrl(_))
        ));
        assert!(validate_novels(&[target("ftp://novels.example.com/book/a")]).is_err());
    }

    #[test]
    fn test_validate_site_template() {
        let good = SiteConfig::default();
        assert!(validate_site_config(&good).is_ok());

        let bad = SiteConfig {
            chapter_url_template: "{base}/chapters".to_string(),
        };
        assert!(validate_site_config(&bad).is_err());
    }

    #[test]
    fn test_validate_selectors() {
        assert!(validate_selectors(&SelectorConfig::default()).is_ok());

        let mut broken = SelectorConfig::default();
        broken.chapter_body = "div[[".to_string();
        assert!(matches!(
            validate_selectors(&broken),
            Err(ConfigError::InvalidSelector { .. })
        ));

        let mut empty = SelectorConfig::default();
        empty.title = "  ".to_string();
        assert!(validate_selectors(&empty).is_err());
    }

    #[test]
    fn test_validate_fetch_delay_floor() {
        let mut ingest = IngestConfig::default();
        assert!(validate_ingest_config(&ingest).is_ok());

        ingest.fetch_delay_ms = 50;
        assert!(validate_ingest_config(&ingest).is_err());
    }
}
