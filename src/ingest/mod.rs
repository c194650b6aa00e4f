//! Ingestion module
//!
//! This module contains the core scraping logic, including:
//! - HTTP fetching and request pacing
//! - Page extraction with CSS selectors
//! - Target resolution and the resume cursor
//! - Per-novel orchestration and the batch runner

mod extractor;
mod fetcher;
mod orchestrator;
mod pacing;
mod runner;
mod target;

pub use extractor::{compile_selector, ChapterPage, Extraction, Extractor, HtmlExtractor};
pub use fetcher::{build_http_client, FetchError, FetchErrorKind, Fetcher, HttpFetcher};
pub use orchestrator::Ingestor;
pub use pacing::{MinimumGap, Pacer, Throttle, Unpaced};
pub use runner::BatchRunner;
pub use target::{parse_declared_count, remaining_chapters, resume_cursor};

use crate::config::Config;
use crate::storage::{open_store, SqliteStore};
use crate::IngestError;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Wires a production batch runner from a validated configuration
///
/// This is the startup step: it opens the progress store and builds the
/// HTTP client and extractor. Any failure here is fatal and nothing has
/// been fetched yet.
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `config_hash` - Hash of the configuration file, stored with the run
/// * `database_path` - Resolved location of the SQLite progress store
///
/// # Returns
///
/// * `Ok(BatchRunner)` - Ready to run
/// * `Err(IngestError::Startup)` - The store, client or extractor could not be built
pub fn build_runner(
    config: &Config,
    config_hash: &str,
    database_path: &Path,
) -> Result<BatchRunner<SqliteStore>, IngestError> {
    build_runner_with_pacer(config, config_hash, database_path, Arc::new(MinimumGap))
}

/// Same as [`build_runner`] with a caller-supplied pacer
pub fn build_runner_with_pacer(
    config: &Config,
    config_hash: &str,
    database_path: &Path,
    pacer: Arc<dyn Pacer>,
) -> Result<BatchRunner<SqliteStore>, IngestError> {
    let store = open_store(database_path).map_err(|e| {
        IngestError::Startup(format!(
            "cannot open progress store at {}: {}",
            database_path.display(),
            e
        ))
    })?;
    info!("Progress store: {}", database_path.display());

    let client = build_http_client(&config.user_agent)
        .map_err(|e| IngestError::Startup(format!("cannot build HTTP client: {}", e)))?;
    let extractor = HtmlExtractor::new(&config.selectors)?;

    let delays = &config.ingest;
    let fetcher = HttpFetcher::new(
        client,
        Throttle::new(pacer.clone(), Duration::from_millis(delays.fetch_delay_ms)),
    );

    let ingestor = Ingestor::new(
        Arc::new(fetcher),
        Arc::new(extractor),
        store,
        &config.site,
        Throttle::new(pacer.clone(), Duration::from_millis(delays.persist_delay_ms)),
    );

    Ok(BatchRunner::new(
        ingestor,
        config.novels.clone(),
        Throttle::new(pacer, Duration::from_millis(delays.novel_delay_ms)),
    )
    .with_config_hash(config_hash))
}
