//! Output module for run statistics and reports
//!
//! This module handles:
//! - Accumulating per-run counters
//! - Rendering the end-of-run report to stdout and to a timestamped file
//! - Printing the persisted per-novel progress overview

mod progress;
mod report;
pub mod stats;

pub use progress::{load_progress_overview, print_progress_overview, ProgressOverview};
pub use report::{format_report, print_report, report_file_name, write_report};
pub use stats::{
    ChapterCounts, ChapterOutcome, NovelOutcome, NovelResult, NovelSummary, RunStatistics,
};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write report to {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
