//! Storage module for persisting ingestion progress
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Novel metadata upserts
//! - Chapter upserts and the per-novel chapter reference set
//! - The resume cursor query (highest stored chapter)
//! - Run tracking

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{ProgressStore, StorageError, StorageResult};

use crate::IngestError;

use std::path::Path;

/// Opens (or creates) the progress store at `path`
pub fn open_store(path: &Path) -> Result<SqliteStore, IngestError> {
    SqliteStore::new(path)
}

/// Novel metadata as extracted from a landing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NovelMetadata {
    pub title: String,
    pub author: Option<String>,
    /// Chapter count as the site reports it, unparsed
    pub declared_chapters: String,
    pub status: Option<String>,
    pub genres: Vec<String>,
    pub summary: Option<String>,
    /// Absolute URL of the novel's chapter list
    pub chapter_list_url: String,
}

/// Fields written for one scraped chapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterContent {
    pub url: String,
    pub title: String,
    pub body: String,
}

/// Represents a novel in the database
#[derive(Debug, Clone)]
pub struct NovelRecord {
    pub id: i64,
    pub identity: String,
    pub metadata: NovelMetadata,
    pub created_at: String,
    pub last_ingested_at: String,
}

/// Represents a chapter in the database
#[derive(Debug, Clone)]
pub struct ChapterRecord {
    pub id: i64,
    pub novel_id: i64,
    pub number: u32,
    pub content: ChapterContent,
    pub scraped_at: String,
}

/// Progress overview for one novel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NovelProgress {
    pub identity: String,
    pub title: String,
    pub declared_chapters: String,
    pub highest_chapter: Option<u32>,
    pub stored_chapters: u64,
    pub last_ingested_at: String,
}

/// Represents an ingestion run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
}

/// Status of an ingestion run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
