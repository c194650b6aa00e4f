//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Novel-Ingest database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track ingestion runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

-- One row per tracked novel, keyed by its normalized landing URL
CREATE TABLE IF NOT EXISTS novels (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    identity TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    author TEXT,
    declared_chapters TEXT NOT NULL,
    status TEXT,
    genres TEXT NOT NULL DEFAULT '[]',
    summary TEXT,
    chapter_list_url TEXT NOT NULL,
    created_at TEXT NOT NULL,
    last_ingested_at TEXT NOT NULL
);

-- Scraped chapters; (novel_id, number) backs the resume cursor query
CREATE TABLE IF NOT EXISTS chapters (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    novel_id INTEGER NOT NULL REFERENCES novels(id),
    number INTEGER NOT NULL,
    url TEXT NOT NULL,
    title TEXT NOT NULL,
    body TEXT NOT NULL,
    scraped_at TEXT NOT NULL,
    UNIQUE(novel_id, number)
);

CREATE INDEX IF NOT EXISTS idx_chapters_novel_number ON chapters(novel_id, number);

-- A novel's set of chapter references
CREATE TABLE IF NOT EXISTS novel_chapter_refs (
    novel_id INTEGER NOT NULL REFERENCES novels(id),
    chapter_id INTEGER NOT NULL REFERENCES chapters(id),
    added_at TEXT NOT NULL,
    PRIMARY KEY(novel_id, chapter_id)
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
