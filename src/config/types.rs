use serde::Deserialize;

/// Environment variable that overrides `[store] database-path`
pub const DATABASE_ENV_VAR: &str = "NOVEL_INGEST_DATABASE";

/// Main configuration structure for Novel-Ingest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    #[serde(default, rename = "novel")]
    pub novels: Vec<NovelTarget>,
}

/// Pacing constants for the ingestion loop
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Minimum time between two page fetches (milliseconds)
    #[serde(rename = "fetch-delay-ms", default = "default_fetch_delay_ms")]
    pub fetch_delay_ms: u64,

    /// Pause after persisting a chapter, before the next fetch (milliseconds)
    #[serde(rename = "persist-delay-ms", default = "default_persist_delay_ms")]
    pub persist_delay_ms: u64,

    /// Pause between two novels (milliseconds)
    #[serde(rename = "novel-delay-ms", default = "default_novel_delay_ms")]
    pub novel_delay_ms: u64,
}

fn default_fetch_delay_ms() -> u64 {
    2000
}

fn default_persist_delay_ms() -> u64 {
    500
}

fn default_novel_delay_ms() -> u64 {
    5000
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            fetch_delay_ms: default_fetch_delay_ms(),
            persist_delay_ms: default_persist_delay_ms(),
            novel_delay_ms: default_novel_delay_ms(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the scraper
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the scraper
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the scraper
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for scraper-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Progress store location
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database file; may come from the environment instead
    #[serde(rename = "database-path")]
    pub database_path: Option<String>,
}

/// Run report output
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving a timestamped text report after each run
    #[serde(rename = "report-dir")]
    pub report_dir: Option<String>,
}

/// How chapter URLs are derived for the target site
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Template with `{base}` (chapter list location) and `{number}` placeholders
    #[serde(
        rename = "chapter-url-template",
        default = "default_chapter_url_template"
    )]
    pub chapter_url_template: String,
}

fn default_chapter_url_template() -> String {
    "{base}/chapter-{number}".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            chapter_url_template: default_chapter_url_template(),
        }
    }
}

/// CSS selectors used by the default HTML extractor
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SelectorConfig {
    pub title: String,
    pub author: String,
    pub chapter_count: String,
    pub status: String,
    pub genres: String,
    pub summary: String,
    /// Element whose `href` points at the chapter list
    pub chapter_list: String,
    pub chapter_title: String,
    pub chapter_body: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            title: "h1.novel-title".to_string(),
            author: ".author a, .author".to_string(),
            chapter_count: ".header-stats .chapters".to_string(),
            status: ".header-stats .status".to_string(),
            genres: ".categories a".to_string(),
            summary: ".summary .content".to_string(),
            chapter_list: "a.chapter-list-link".to_string(),
            chapter_title: ".chapter-title".to_string(),
            chapter_body: "#chapter-container".to_string(),
        }
    }
}

/// A novel tracked by the scraper
#[derive(Debug, Clone, Deserialize)]
pub struct NovelTarget {
    /// Landing page of the novel; its normalized form is the novel's identity
    pub url: String,
}
