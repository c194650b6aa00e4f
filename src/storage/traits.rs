//! Storage traits and error types
//!
//! This module defines the trait interface for progress store backends and
//! associated error types.

use crate::storage::{
    ChapterContent, ChapterRecord, NovelMetadata, NovelProgress, NovelRecord, RunRecord,
    RunStatus,
};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for progress store implementations
///
/// The store is the only state that survives between runs. Ingestion reads
/// the resume cursor from it and writes every scraped chapter to it the
/// moment the chapter is scraped.
pub trait ProgressStore {
    // ===== Novels =====

    /// Creates or overwrites a novel's metadata
    ///
    /// Every field is replaced (last write wins) except the novel's chapter
    /// reference set, which is left untouched.
    ///
    /// # Returns
    ///
    /// The novel ID, stable across calls for the same identity
    fn upsert_novel(&mut self, identity: &str, metadata: &NovelMetadata) -> StorageResult<i64>;

    /// Gets a novel by its identity
    fn get_novel_by_identity(&self, identity: &str) -> StorageResult<Option<NovelRecord>>;

    // ===== Chapters =====

    /// Returns the highest stored chapter number for a novel
    ///
    /// `None` means no chapter is stored yet and ingestion starts at 1.
    fn highest_chapter_number(&self, novel_id: i64) -> StorageResult<Option<u32>>;

    /// Creates or overwrites the chapter `number` of a novel
    ///
    /// # Returns
    ///
    /// The chapter ID, stable across overwrites
    fn upsert_chapter(
        &mut self,
        novel_id: i64,
        number: u32,
        content: &ChapterContent,
    ) -> StorageResult<i64>;

    /// Gets a single chapter
    fn get_chapter(&self, novel_id: i64, number: u32) -> StorageResult<Option<ChapterRecord>>;

    /// Adds a chapter to the novel's reference set
    ///
    /// # Returns
    ///
    /// `true` if the reference was added, `false` if it was already present
    fn add_chapter_reference(&mut self, novel_id: i64, chapter_id: i64) -> StorageResult<bool>;

    /// Lists the chapter IDs referenced by a novel, in ascending order
    fn chapter_references(&self, novel_id: i64) -> StorageResult<Vec<i64>>;

    // ===== Run Management =====

    /// Creates a new run record in the `Running` state
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Sets the final status and finish timestamp of a run
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    // ===== Statistics =====

    /// Per-novel progress overview, in insertion order
    fn list_novel_progress(&self) -> StorageResult<Vec<NovelProgress>>;

    /// Gets total novel count
    fn count_novels(&self) -> StorageResult<u64>;

    /// Gets total chapter count across all novels
    fn count_chapters(&self) -> StorageResult<u64>;
}
