//! Persisted progress overview for the `--status` mode

use crate::output::OutputResult;
use crate::storage::{NovelProgress, ProgressStore, RunRecord};

/// Snapshot of what the progress store holds
#[derive(Debug, Clone)]
pub struct ProgressOverview {
    pub novels: u64,
    pub chapters: u64,
    pub latest_run: Option<RunRecord>,
    pub per_novel: Vec<NovelProgress>,
}

/// Loads the progress overview from a store
pub fn load_progress_overview(store: &dyn ProgressStore) -> OutputResult<ProgressOverview> {
    Ok(ProgressOverview {
        novels: store.count_novels()?,
        chapters: store.count_chapters()?,
        latest_run: store.get_latest_run()?,
        per_novel: store.list_novel_progress()?,
    })
}

/// Prints the progress overview to stdout
pub fn print_progress_overview(overview: &ProgressOverview) {
    println!("=== Ingestion Progress ===\n");

    println!("Overview:");
    println!("  Novels tracked: {}", overview.novels);
    println!("  Chapters stored: {}", overview.chapters);
    match &overview.latest_run {
        Some(run) => println!(
            "  Latest run: #{} started {} ({})",
            run.id,
            run.started_at,
            run.status.to_db_string()
        ),
        None => println!("  Latest run: none"),
    }
    println!();

    if overview.per_novel.is_empty() {
        return;
    }

    println!("Novels:");
    for novel in &overview.per_novel {
        let highest = novel
            .highest_chapter
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {} [{} stored, highest {}, declared {:?}]",
            novel.title, novel.stored_chapters, highest, novel.declared_chapters
        );
        println!("      {} (last ingested {})", novel.identity, novel.last_ingested_at);
    }
}
