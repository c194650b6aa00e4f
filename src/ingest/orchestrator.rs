//! Per-novel ingestion
//!
//! The [`Ingestor`] drives one novel through its phases:
//!
//! 1. **FetchingMetadata**: fetch the landing page and extract metadata
//! 2. **ResolvingTarget**: parse the declared chapter count, upsert the novel
//! 3. **Ingesting**: fetch chapters from the resume cursor to the target,
//!    persisting each one the moment it is scraped
//! 4. **Done**
//!
//! A failure before the chapter loop moves the novel to `Skipped` and nothing
//! after the failing step runs. Inside the loop, a failing chapter is counted
//! and the loop moves on; the chapter stays a gap in the store.

use crate::config::{NovelTarget, SiteConfig};
use crate::ingest::extractor::{Extraction, Extractor};
use crate::ingest::fetcher::Fetcher;
use crate::ingest::pacing::Throttle;
use crate::ingest::target::{parse_declared_count, remaining_chapters, resume_cursor};
use crate::output::{ChapterCounts, ChapterOutcome, NovelOutcome, RunStatistics};
use crate::state::{IngestPhase, SkipReason};
use crate::storage::{ChapterContent, ProgressStore};
use crate::url::{chapter_url, normalize_url};
use crate::{IngestError, UrlError};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// What came out of one chapter attempt
enum ChapterAttempt {
    Scraped(ChapterContent),
    Empty,
    Failed(String),
}

/// Tracks one novel's phase and counters for the current run
struct NovelRun {
    outcome: NovelOutcome,
}

impl NovelRun {
    fn new(identity: String) -> Self {
        Self {
            outcome: NovelOutcome {
                identity,
                title: None,
                phase: IngestPhase::FetchingMetadata,
                skip_reason: None,
                target: None,
                resume_from: None,
                chapters: ChapterCounts::default(),
            },
        }
    }

    fn phase(&self) -> IngestPhase {
        self.outcome.phase
    }

    fn advance(&mut self, next: IngestPhase) -> Result<(), IngestError> {
        let from = self.outcome.phase;
        if !from.can_transition_to(next) {
            return Err(IngestError::InvalidTransition { from, to: next });
        }
        debug!("{}: {} -> {}", self.outcome.identity, from, next);
        self.outcome.phase = next;
        Ok(())
    }

    fn skip(mut self, reason: SkipReason) -> Result<NovelOutcome, IngestError> {
        warn!(
            "Skipping {} during {}: {}",
            self.outcome.identity,
            self.phase(),
            reason
        );
        self.advance(IngestPhase::Skipped)?;
        self.outcome.skip_reason = Some(reason);
        Ok(self.outcome)
    }

    fn finish(mut self) -> Result<NovelOutcome, IngestError> {
        self.advance(IngestPhase::Done)?;
        Ok(self.outcome)
    }
}

/// Ingests novels one at a time into a [`ProgressStore`]
pub struct Ingestor<S: ProgressStore> {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    store: S,
    chapter_url_template: String,
    /// Pause between two chapter iterations, measured from the last persist
    chapter_gap: Throttle,
}

impl<S: ProgressStore> Ingestor<S> {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn Extractor>,
        store: S,
        site: &SiteConfig,
        chapter_gap: Throttle,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            store,
            chapter_url_template: site.chapter_url_template.clone(),
            chapter_gap,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Runs one novel from its landing page to its declared chapter count
    ///
    /// Chapter and persistence counters are pushed into `stats` as they
    /// happen, so they survive an error escaping mid-loop.
    ///
    /// # Returns
    ///
    /// * `Ok(NovelOutcome)` - The novel reached `Done` or `Skipped`
    /// * `Err(IngestError)` - Writing the novel record or reading the resume
    ///   cursor failed; the batch runner counts the novel as failed
    pub async fn ingest_novel(
        &mut self,
        target: &NovelTarget,
        stats: &mut RunStatistics,
    ) -> Result<NovelOutcome, IngestError> {
        let identity = normalize_url(&target.url)?.to_string();
        let landing_url = Url::parse(&target.url).map_err(|e| UrlError::Parse(e.to_string()))?;
        let mut run = NovelRun::new(identity.clone());

        // ===== FetchingMetadata =====
        let page = match self.fetcher.fetch(&target.url).await {
            Ok(page) => page,
            Err(e) => return run.skip(SkipReason::MetadataFetch(e.to_string())),
        };

        let metadata = match self.extractor.extract_novel(&page, &landing_url) {
            Extraction::Found(metadata) => metadata,
            Extraction::Missing(field) => {
                return run.skip(SkipReason::MissingField(field.to_string()))
            }
        };
        run.outcome.title = Some(metadata.title.clone());
        run.advance(IngestPhase::ResolvingTarget)?;

        // ===== ResolvingTarget =====
        let Some(target_count) = parse_declared_count(&metadata.declared_chapters) else {
            return run.skip(SkipReason::InvalidChapterCount(
                metadata.declared_chapters.clone(),
            ));
        };
        run.outcome.target = Some(target_count);

        let novel_id = self.store.upsert_novel(&identity, &metadata)?;
        run.advance(IngestPhase::Ingesting)?;

        // ===== Ingesting =====
        let highest = self.store.highest_chapter_number(novel_id)?;
        let cursor = resume_cursor(highest);
        run.outcome.resume_from = Some(cursor);

        if cursor > target_count {
            info!(
                "\"{}\" is complete ({} of {} chapters stored)",
                metadata.title,
                highest.unwrap_or(0),
                target_count
            );
        } else {
            info!(
                "\"{}\": ingesting chapters {}..={}",
                metadata.title, cursor, target_count
            );
        }

        for number in remaining_chapters(highest, target_count) {
            self.chapter_gap.ready().await;

            match self.scrape_chapter(&metadata.chapter_list_url, number).await {
                ChapterAttempt::Scraped(content) => {
                    debug!("Chapter {} of \"{}\" scraped", number, metadata.title);
                    record_chapter(&mut run, stats, ChapterOutcome::Scraped);
                    self.persist_chapter(novel_id, number, &content, &mut run, stats);
                    self.chapter_gap.mark();
                }
                ChapterAttempt::Empty => {
                    warn!("Chapter {} of \"{}\" has an empty body", number, metadata.title);
                    record_chapter(&mut run, stats, ChapterOutcome::Empty);
                }
                ChapterAttempt::Failed(reason) => {
                    warn!("Chapter {} of \"{}\" failed: {}", number, metadata.title, reason);
                    record_chapter(&mut run, stats, ChapterOutcome::Errored);
                }
            }
        }

        let counts = run.outcome.chapters;
        info!(
            "\"{}\" done: {} attempted, {} scraped, {} empty, {} errored",
            metadata.title, counts.attempted, counts.succeeded, counts.empty, counts.errored
        );

        run.finish()
    }

    async fn scrape_chapter(&self, chapter_list_url: &str, number: u32) -> ChapterAttempt {
        let url = match chapter_url(&self.chapter_url_template, chapter_list_url, number) {
            Ok(url) => url,
            Err(e) => return ChapterAttempt::Failed(e.to_string()),
        };

        let page = match self.fetcher.fetch(url.as_str()).await {
            Ok(page) => page,
            Err(e) => return ChapterAttempt::Failed(e.to_string()),
        };

        match self.extractor.extract_chapter(&page) {
            Extraction::Missing(field) => {
                ChapterAttempt::Failed(format!("{} not found at {}", field, url))
            }
            Extraction::Found(chapter) if chapter.body.trim().is_empty() => ChapterAttempt::Empty,
            Extraction::Found(chapter) => ChapterAttempt::Scraped(ChapterContent {
                url: url.to_string(),
                title: chapter
                    .title
                    .filter(|title| !title.trim().is_empty())
                    .unwrap_or_else(|| format!("Chapter {}", number)),
                body: chapter.body,
            }),
        }
    }

    /// Writes the chapter, then adds it to the novel's reference set
    ///
    /// If the chapter write fails but an earlier version of the chapter is
    /// stored, the reference is still added for that version. A chapter that
    /// does not exist is never referenced.
    fn persist_chapter(
        &mut self,
        novel_id: i64,
        number: u32,
        content: &ChapterContent,
        run: &mut NovelRun,
        stats: &mut RunStatistics,
    ) {
        let chapter_id = match self.store.upsert_chapter(novel_id, number, content) {
            Ok(id) => {
                record_persist(run, stats, true);
                Some(id)
            }
            Err(e) => {
                warn!("Failed to store chapter {} of novel {}: {}", number, novel_id, e);
                record_persist(run, stats, false);
                self.store
                    .get_chapter(novel_id, number)
                    .ok()
                    .flatten()
                    .map(|existing| existing.id)
            }
        };

        let Some(chapter_id) = chapter_id else {
            return;
        };

        if let Err(e) = self.store.add_chapter_reference(novel_id, chapter_id) {
            warn!(
                "Failed to reference chapter {} from novel {}: {}",
                number, novel_id, e
            );
            record_persist(run, stats, false);
        }
    }
}

fn record_chapter(run: &mut NovelRun, stats: &mut RunStatistics, outcome: ChapterOutcome) {
    run.outcome.chapters.record(outcome);
    stats.record_chapter(outcome);
}

fn record_persist(run: &mut NovelRun, stats: &mut RunStatistics, ok: bool) {
    run.outcome.chapters.record_persist(ok);
    stats.record_persist(ok);
}
