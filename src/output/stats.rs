//! Run statistics accumulated during one batch invocation
//!
//! The orchestrator and batch runner push events in as they happen; nothing
//! here makes decisions. The struct lives for a single run and is discarded
//! after it has been reported.

use crate::state::{IngestPhase, SkipReason};
use chrono::{DateTime, Duration, Utc};

/// Result of one chapter attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterOutcome {
    /// Fetched and extracted with a non-empty body
    Scraped,
    /// Extracted, but the body was blank
    Empty,
    /// Fetch failed or a required chapter field was missing
    Errored,
}

/// Chapter counters, kept per novel and for the whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChapterCounts {
    pub attempted: u64,
    pub succeeded: u64,
    pub empty: u64,
    pub errored: u64,
    pub persisted: u64,
    pub persist_errors: u64,
}

impl ChapterCounts {
    /// Counts one chapter attempt and its outcome
    pub fn record(&mut self, outcome: ChapterOutcome) {
        self.attempted += 1;
        match outcome {
            ChapterOutcome::Scraped => self.succeeded += 1,
            ChapterOutcome::Empty => self.empty += 1,
            ChapterOutcome::Errored => self.errored += 1,
        }
    }

    /// Counts one store write
    pub fn record_persist(&mut self, ok: bool) {
        if ok {
            self.persisted += 1;
        } else {
            self.persist_errors += 1;
        }
    }
}

/// What happened to one novel during the run
#[derive(Debug, Clone)]
pub struct NovelOutcome {
    pub identity: String,
    pub title: Option<String>,
    /// Terminal phase reached (`Done` or `Skipped`)
    pub phase: IngestPhase,
    pub skip_reason: Option<SkipReason>,
    /// Parsed declared chapter count
    pub target: Option<u32>,
    /// First chapter number attempted this run
    pub resume_from: Option<u32>,
    pub chapters: ChapterCounts,
}

/// Final classification of a novel in the run summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NovelResult {
    Processed,
    Skipped(SkipReason),
    /// An unexpected error or panic escaped the orchestrator
    Failed(String),
}

/// One line of the per-novel section of the report
#[derive(Debug, Clone)]
pub struct NovelSummary {
    pub identity: String,
    pub title: Option<String>,
    pub result: NovelResult,
    pub target: Option<u32>,
    pub resume_from: Option<u32>,
    pub chapters: ChapterCounts,
}

/// Counters for one batch invocation
#[derive(Debug, Clone)]
pub struct RunStatistics {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    pub novels_processed: u64,
    pub novels_skipped: u64,
    pub novels_failed: u64,

    /// Chapter counters across all novels
    pub chapters: ChapterCounts,

    pub novels: Vec<NovelSummary>,
}

impl Default for RunStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStatistics {
    /// Starts a new run clock
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            novels_processed: 0,
            novels_skipped: 0,
            novels_failed: 0,
            chapters: ChapterCounts::default(),
            novels: Vec::new(),
        }
    }

    /// Counts one chapter attempt
    pub fn record_chapter(&mut self, outcome: ChapterOutcome) {
        self.chapters.record(outcome);
    }

    /// Counts one store write
    pub fn record_persist(&mut self, ok: bool) {
        self.chapters.record_persist(ok);
    }

    /// Records the end of a novel that reached a terminal phase
    ///
    /// Chapter counters are not added again here; they were recorded as the
    /// chapters happened.
    pub fn record_novel(&mut self, outcome: &NovelOutcome) {
        let result = match (&outcome.phase, &outcome.skip_reason) {
            (IngestPhase::Skipped, Some(reason)) => NovelResult::Skipped(reason.clone()),
            (IngestPhase::Skipped, None) => {
                NovelResult::Failed("skipped without a reason".to_string())
            }
            _ => NovelResult::Processed,
        };

        match result {
            NovelResult::Processed => self.novels_processed += 1,
            NovelResult::Skipped(_) => self.novels_skipped += 1,
            NovelResult::Failed(_) => self.novels_failed += 1,
        }

        self.novels.push(NovelSummary {
            identity: outcome.identity.clone(),
            title: outcome.title.clone(),
            result,
            target: outcome.target,
            resume_from: outcome.resume_from,
            chapters: outcome.chapters,
        });
    }

    /// Records a novel whose ingestion ended with an unexpected error
    pub fn record_failed_novel(&mut self, identity: &str, message: String) {
        self.novels_failed += 1;
        self.novels.push(NovelSummary {
            identity: identity.to_string(),
            title: None,
            result: NovelResult::Failed(message),
            target: None,
            resume_from: None,
            chapters: ChapterCounts::default(),
        });
    }

    /// Stops the run clock
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration of the run, once finished
    pub fn duration(&self) -> Option<Duration> {
        self.finished_at.map(|end| end - self.started_at)
    }

    /// Total novels seen by the runner
    pub fn novels_total(&self) -> u64 {
        self.novels_processed + self.novels_skipped + self.novels_failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(phase: IngestPhase, skip_reason: Option<SkipReason>) -> NovelOutcome {
        NovelOutcome {
            identity: "https://example.com/book/a".to_string(),
            title: Some("A".to_string()),
            phase,
            skip_reason,
            target: Some(3),
            resume_from: Some(1),
            chapters: ChapterCounts::default(),
        }
    }

    #[test]
    fn test_chapter_counts_record() {
        let mut counts = ChapterCounts::default();
        counts.record(ChapterOutcome::Scraped);
        counts.record(ChapterOutcome::Scraped);
        counts.record(ChapterOutcome::Empty);
        counts.record(ChapterOutcome::Errored);
        counts.record_persist(true);
        counts.record_persist(false);

        assert_eq!(counts.attempted, 4);
        assert_eq!(counts.succeeded, 2);
        assert_eq!(counts.empty, 1);
        assert_eq!(counts.errored, 1);
        assert_eq!(counts.persisted, 1);
        assert_eq!(counts.persist_errors, 1);
    }

    #[test]
    fn test_record_novel_classification() {
        let mut stats = RunStatistics::new();
        stats.record_novel(&outcome(IngestPhase::Done, None));
        stats.record_novel(&outcome(
            IngestPhase::Skipped,
            Some(SkipReason::MissingField("title".to_string())),
        ));
        stats.record_failed_novel("https://example.com/book/c", "boom".to_string());

        assert_eq!(stats.novels_processed, 1);
        assert_eq!(stats.novels_skipped, 1);
        assert_eq!(stats.novels_failed, 1);
        assert_eq!(stats.novels_total(), 3);
        assert_eq!(stats.novels.len(), 3);
        assert_eq!(stats.novels[2].result, NovelResult::Failed("boom".to_string()));
    }

    #[test]
    fn test_duration_only_after_finish() {
        let mut stats = RunStatistics::new();
        assert!(stats.duration().is_none());

        stats.finish();
        let duration = stats.duration().unwrap();
        assert!(duration >= Duration::zero());
    }
}
