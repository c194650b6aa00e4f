//! Plain-text run report
//!
//! The same text is printed at the end of every run and, when a report
//! directory is configured, written to `ingest-report-YYYYMMDD-HHMMSS.txt`.

use crate::output::stats::{NovelResult, RunStatistics};
use crate::output::{OutputError, OutputResult};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the report for a run finished at `finished_at`
pub fn report_file_name(finished_at: DateTime<Utc>) -> String {
    format!("ingest-report-{}.txt", finished_at.format("%Y%m%d-%H%M%S"))
}

/// Formats run statistics as a human-readable report
pub fn format_report(stats: &RunStatistics) -> String {
    let mut out = String::new();

    out.push_str("=== Novel Ingest Run Report ===\n\n");

    out.push_str(&format!(
        "Started:  {}\n",
        stats.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(finished) = stats.finished_at {
        out.push_str(&format!(
            "Finished: {}\n",
            finished.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    if let Some(duration) = stats.duration() {
        let seconds = duration.num_milliseconds() as f64 / 1000.0;
        out.push_str(&format!(
            "Duration: {:.1} seconds ({:.2} minutes)\n",
            seconds,
            seconds / 60.0
        ));
    }
    out.push('\n');

    out.push_str("Novels:\n");
    out.push_str(&format!("  Processed: {}\n", stats.novels_processed));
    out.push_str(&format!("  Skipped:   {}\n", stats.novels_skipped));
    out.push_str(&format!("  Failed:    {}\n", stats.novels_failed));
    out.push('\n');

    let chapters = &stats.chapters;
    out.push_str("Chapters:\n");
    out.push_str(&format!("  Attempted: {}\n", chapters.attempted));
    out.push_str(&format!("  Succeeded: {}\n", chapters.succeeded));
    out.push_str(&format!("  Empty:     {}\n", chapters.empty));
    out.push_str(&format!("  Errored:   {}\n", chapters.errored));
    out.push('\n');

    out.push_str("Persistence:\n");
    out.push_str(&format!("  Stored:    {}\n", chapters.persisted));
    out.push_str(&format!("  Errors:    {}\n", chapters.persist_errors));

    if !stats.novels.is_empty() {
        out.push_str("\nPer Novel:\n");
        for novel in &stats.novels {
            let name = novel.title.as_deref().unwrap_or(&novel.identity);
            let status = match &novel.result {
                NovelResult::Processed => "processed".to_string(),
                NovelResult::Skipped(reason) => format!("skipped ({})", reason),
                NovelResult::Failed(message) => format!("failed ({})", message),
            };
            out.push_str(&format!("  - {}: {}\n", name, status));

            if let (Some(from), Some(target)) = (novel.resume_from, novel.target) {
                let c = &novel.chapters;
                if from > target {
                    out.push_str(&format!("      complete at {} chapters\n", target));
                } else {
                    out.push_str(&format!(
                        "      chapters {}..={}: {} scraped, {} empty, {} errored\n",
                        from, target, c.succeeded, c.empty, c.errored
                    ));
                }
            }
        }
    }

    out
}

/// Prints the run report to stdout
pub fn print_report(stats: &RunStatistics) {
    println!("{}", format_report(stats));
}

/// Writes the run report into `dir`, creating the directory if needed
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written report
/// * `Err(OutputError)` - Failed to create the directory or write the file
pub fn write_report(stats: &RunStatistics, dir: &Path) -> OutputResult<PathBuf> {
    let write_error = |path: &Path, source: std::io::Error| OutputError::Write {
        path: path.display().to_string(),
        source,
    };

    fs::create_dir_all(dir).map_err(|e| write_error(dir, e))?;

    let finished_at = stats.finished_at.unwrap_or_else(Utc::now);
    let path = dir.join(report_file_name(finished_at));
    fs::write(&path, format_report(stats)).map_err(|e| write_error(&path, e))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::stats::{ChapterCounts, ChapterOutcome, NovelOutcome};
    use crate::state::{IngestPhase, SkipReason};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn sample_stats() -> RunStatistics {
        let mut stats = RunStatistics::new();
        for outcome in [
            ChapterOutcome::Scraped,
            ChapterOutcome::Scraped,
            ChapterOutcome::Empty,
        ] {
            stats.record_chapter(outcome);
        }
        stats.record_persist(true);
        stats.record_persist(true);

        let mut chapters = ChapterCounts::default();
        chapters.succeeded = 2;
        chapters.empty = 1;
        stats.record_novel(&NovelOutcome {
            identity: "https://example.com/book/a".to_string(),
            title: Some("Book A".to_string()),
            phase: IngestPhase::Done,
            skip_reason: None,
            target: Some(3),
            resume_from: Some(1),
            chapters,
        });
        stats.record_novel(&NovelOutcome {
            identity: "https://example.com/book/b".to_string(),
            title: None,
            phase: IngestPhase::Skipped,
            skip_reason: Some(SkipReason::InvalidChapterCount("TBD".to_string())),
            target: None,
            resume_from: None,
            chapters: ChapterCounts::default(),
        });
        stats.finish();
        stats
    }

    #[test]
    fn test_report_file_name() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(report_file_name(at), "ingest-report-20240309-070501.txt");
    }

    #[test]
    fn test_format_report_contents() {
        let report = format_report(&sample_stats());

        assert!(report.contains("Processed: 1"));
        assert!(report.contains("Skipped:   1"));
        assert!(report.contains("Attempted: 3"));
        assert!(report.contains("Empty:     1"));
        assert!(report.contains("Stored:    2"));
        assert!(report.contains("Book A: processed"));
        assert!(report.contains("chapters 1..=3: 2 scraped, 1 empty, 0 errored"));
        assert!(report.contains("https://example.com/book/b: skipped"));
        assert!(report.contains("Duration:"));
    }

    #[test]
    fn test_write_report_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("reports");
        let stats = sample_stats();

        let path = write_report(&stats, &dir).unwrap();

        assert!(path.starts_with(&dir));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("ingest-report-"));
        assert!(name.ends_with(".txt"));
        assert_eq!(fs::read_to_string(&path).unwrap(), format_report(&stats));
    }
}
