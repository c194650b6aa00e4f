//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ProgressStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ProgressStore, StorageError, StorageResult};
use crate::storage::{
    ChapterContent, ChapterRecord, NovelMetadata, NovelProgress, NovelRecord, RunRecord,
    RunStatus,
};
use crate::IngestError;
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite progress store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Creates a new SqliteStore instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(IngestError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, IngestError> {
        let conn = Connection::open(path)?;

        // Every chapter write must be durable before its reference is added
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = FULL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self, IngestError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Genres are stored as a JSON array so labels may contain commas
fn encode_genres(genres: &[String]) -> rusqlite::Result<String> {
    serde_json::to_string(genres).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn decode_genres(raw: &str) -> rusqlite::Result<Vec<String>> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))
}

fn novel_from_row(row: &Row<'_>) -> rusqlite::Result<NovelRecord> {
    Ok(NovelRecord {
        id: row.get(0)?,
        identity: row.get(1)?,
        metadata: NovelMetadata {
            title: row.get(2)?,
            author: row.get(3)?,
            declared_chapters: row.get(4)?,
            status: row.get(5)?,
            genres: decode_genres(&row.get::<_, String>(6)?)?,
            summary: row.get(7)?,
            chapter_list_url: row.get(8)?,
        },
        created_at: row.get(9)?,
        last_ingested_at: row.get(10)?,
    })
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Running),
    })
}

impl ProgressStore for SqliteStore {
    // ===== Novels =====

    fn upsert_novel(&mut self, identity: &str, metadata: &NovelMetadata) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        let genres = encode_genres(&metadata.genres)?;
        self.conn.execute(
            "INSERT INTO novels (identity, title, author, declared_chapters, status, genres,
             summary, chapter_list_url, created_at, last_ingested_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
             ON CONFLICT(identity) DO UPDATE SET
                title = excluded.title,
                author = excluded.author,
                declared_chapters = excluded.declared_chapters,
                status = excluded.status,
                genres = excluded.genres,
                summary = excluded.summary,
                chapter_list_url = excluded.chapter_list_url,
                last_ingested_at = excluded.last_ingested_at",
            params![
                identity,
                metadata.title,
                metadata.author,
                metadata.declared_chapters,
                metadata.status,
                genres,
                metadata.summary,
                metadata.chapter_list_url,
                now,
            ],
        )?;

        let id = self.conn.query_row(
            "SELECT id FROM novels WHERE identity = ?1",
            params![identity],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn get_novel_by_identity(&self, identity: &str) -> StorageResult<Option<NovelRecord>> {
        let novel = self
            .conn
            .query_row(
                "SELECT id, identity, title, author, declared_chapters, status, genres, summary,
                 chapter_list_url, created_at, last_ingested_at
                 FROM novels WHERE identity = ?1",
                params![identity],
                novel_from_row,
            )
            .optional()?;

        Ok(novel)
    }

    // ===== Chapters =====

    fn highest_chapter_number(&self, novel_id: i64) -> StorageResult<Option<u32>> {
        let highest: Option<u32> = self.conn.query_row(
            "SELECT MAX(number) FROM chapters WHERE novel_id = ?1",
            params![novel_id],
            |row| row.get(0),
        )?;
        Ok(highest)
    }

    fn upsert_chapter(
        &mut self,
        novel_id: i64,
        number: u32,
        content: &ChapterContent,
    ) -> StorageResult<i64> {
        if number == 0 {
            return Err(StorageError::ConstraintViolation(
                "chapter numbers start at 1".to_string(),
            ));
        }
        if content.body.trim().is_empty() {
            return Err(StorageError::ConstraintViolation(format!(
                "chapter {} of novel {} has an empty body",
                number, novel_id
            )));
        }

        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO chapters (novel_id, number, url, title, body, scraped_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(novel_id, number) DO UPDATE SET
                url = excluded.url,
                title = excluded.title,
                body = excluded.body,
                scraped_at = excluded.scraped_at",
            params![novel_id, number, content.url, content.title, content.body, now],
        )?;

        let id = self.conn.query_row(
            "SELECT id FROM chapters WHERE novel_id = ?1 AND number = ?2",
            params![novel_id, number],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn get_chapter(&self, novel_id: i64, number: u32) -> StorageResult<Option<ChapterRecord>> {
        let chapter = self
            .conn
            .query_row(
                "SELECT id, novel_id, number, url, title, body, scraped_at
                 FROM chapters WHERE novel_id = ?1 AND number = ?2",
                params![novel_id, number],
                |row| {
                    Ok(ChapterRecord {
                        id: row.get(0)?,
                        novel_id: row.get(1)?,
                        number: row.get(2)?,
                        content: ChapterContent {
                            url: row.get(3)?,
                            title: row.get(4)?,
                            body: row.get(5)?,
                        },
                        scraped_at: row.get(6)?,
                    })
                },
            )
            .optional()?;

        Ok(chapter)
    }

    fn add_chapter_reference(&mut self, novel_id: i64, chapter_id: i64) -> StorageResult<bool> {
        let now = Utc::now().to_rfc3339();
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO novel_chapter_refs (novel_id, chapter_id, added_at)
             VALUES (?1, ?2, ?3)",
            params![novel_id, chapter_id, now],
        )?;
        Ok(inserted > 0)
    }

    fn chapter_references(&self, novel_id: i64) -> StorageResult<Vec<i64>> {
        let mut stmt = self.conn.prepare(
            "SELECT chapter_id FROM novel_chapter_refs WHERE novel_id = ?1 ORDER BY chapter_id",
        )?;

        let refs = stmt
            .query_map(params![novel_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(refs)
    }

    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status
                 FROM runs ORDER BY id DESC LIMIT 1",
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }

    // ===== Statistics =====

    fn list_novel_progress(&self) -> StorageResult<Vec<NovelProgress>> {
        let mut stmt = self.conn.prepare(
            "SELECT n.identity, n.title, n.declared_chapters, MAX(c.number), COUNT(c.id),
             n.last_ingested_at
             FROM novels n
             LEFT JOIN chapters c ON c.novel_id = n.id
             GROUP BY n.id
             ORDER BY n.id",
        )?;

        let progress = stmt
            .query_map([], |row| {
                Ok(NovelProgress {
                    identity: row.get(0)?,
                    title: row.get(1)?,
                    declared_chapters: row.get(2)?,
                    highest_chapter: row.get(3)?,
                    stored_chapters: row.get::<_, i64>(4)? as u64,
                    last_ingested_at: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(progress)
    }

    fn count_novels(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM novels", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_chapters(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM chapters", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
