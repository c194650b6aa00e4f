//! Page extraction
//!
//! Turns fetched pages into typed records. A required field that is absent
//! yields [`Extraction::Missing`] instead of a partial record, so callers
//! never see a half-populated value.

use crate::config::SelectorConfig;
use crate::storage::NovelMetadata;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Result of pulling a record out of a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction<T> {
    Found(T),
    /// Name of the first required field that could not be located
    Missing(&'static str),
}

/// Title and body of one chapter page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterPage {
    /// `None` when the page has no chapter heading
    pub title: Option<String>,
    /// May be blank; the caller decides what an empty body means
    pub body: String,
}

/// Reads novel and chapter pages
pub trait Extractor: Send + Sync {
    /// Extracts a novel's metadata from its landing page
    ///
    /// Title, declared chapter count and chapter-list location are required.
    /// `page_url` resolves a relative chapter-list link.
    fn extract_novel(&self, page: &str, page_url: &Url) -> Extraction<NovelMetadata>;

    /// Extracts a chapter; the body element is required
    fn extract_chapter(&self, page: &str) -> Extraction<ChapterPage>;
}

/// Compiles a configured CSS selector
///
/// # Errors
///
/// Returns `ConfigError::InvalidSelector` if `css` is blank or does not parse.
pub fn compile_selector(field: &str, css: &str) -> Result<Selector, ConfigError> {
    if css.trim().is_empty() {
        return Err(ConfigError::InvalidSelector {
            field: field.to_string(),
            message: "selector is empty".to_string(),
        });
    }

    Selector::parse(css).map_err(|e| ConfigError::InvalidSelector {
        field: field.to_string(),
        message: format!("{:?}", e),
    })
}

struct Selectors {
    title: Selector,
    author: Selector,
    chapter_count: Selector,
    status: Selector,
    genres: Selector,
    summary: Selector,
    chapter_list: Selector,
    chapter_title: Selector,
    chapter_body: Selector,
    paragraph: Selector,
}

impl Selectors {
    fn compile(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            title: compile_selector("title", &config.title)?,
            author: compile_selector("author", &config.author)?,
            chapter_count: compile_selector("chapter-count", &config.chapter_count)?,
            status: compile_selector("status", &config.status)?,
            genres: compile_selector("genres", &config.genres)?,
            summary: compile_selector("summary", &config.summary)?,
            chapter_list: compile_selector("chapter-list", &config.chapter_list)?,
            chapter_title: compile_selector("chapter-title", &config.chapter_title)?,
            chapter_body: compile_selector("chapter-body", &config.chapter_body)?,
            paragraph: compile_selector("paragraph", "p")?,
        })
    }
}

/// [`Extractor`] driven by the configured CSS selectors
pub struct HtmlExtractor {
    selectors: Selectors,
}

impl HtmlExtractor {
    pub fn new(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            selectors: Selectors::compile(config)?,
        })
    }

    fn chapter_list_url(&self, document: &Html, page_url: &Url) -> Option<String> {
        let href = document
            .select(&self.selectors.chapter_list)
            .find_map(|element| element.value().attr("href"))?;

        page_url.join(href.trim()).ok().map(|url| url.to_string())
    }

    /// Paragraph text joined by blank lines, or the whole text when the body
    /// has no `<p>` children
    fn body_text(&self, element: ElementRef<'_>) -> String {
        let paragraphs: Vec<String> = element
            .select(&self.selectors.paragraph)
            .map(element_text)
            .filter(|p| !p.is_empty())
            .collect();

        if paragraphs.is_empty() {
            element_text(element)
        } else {
            paragraphs.join("\n\n")
        }
    }
}

impl Extractor for HtmlExtractor {
    fn extract_novel(&self, page: &str, page_url: &Url) -> Extraction<NovelMetadata> {
        let document = Html::parse_document(page);

        let Some(title) = first_text(&document, &self.selectors.title) else {
            return Extraction::Missing("title");
        };
        let Some(declared_chapters) = first_text(&document, &self.selectors.chapter_count) else {
            return Extraction::Missing("chapter-count");
        };
        let Some(chapter_list_url) = self.chapter_list_url(&document, page_url) else {
            return Extraction::Missing("chapter-list");
        };

        let genres = document
            .select(&self.selectors.genres)
            .map(element_text)
            .filter(|genre| !genre.is_empty())
            .collect();

        Extraction::Found(NovelMetadata {
            title,
            author: first_text(&document, &self.selectors.author),
            declared_chapters,
            status: first_text(&document, &self.selectors.status),
            genres,
            summary: first_text(&document, &self.selectors.summary),
            chapter_list_url,
        })
    }

    fn extract_chapter(&self, page: &str) -> Extraction<ChapterPage> {
        let document = Html::parse_document(page);

        let Some(body) = document.select(&self.selectors.chapter_body).next() else {
            return Extraction::Missing("chapter-body");
        };

        Extraction::Found(ChapterPage {
            title: first_text(&document, &self.selectors.chapter_title),
            body: self.body_text(body),
        })
    }
}

/// Trimmed text of the first non-blank match
fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .map(element_text)
        .find(|text| !text.is_empty())
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
