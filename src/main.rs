//! Novel-Ingest main entry point
//!
//! This is the command-line interface for the Novel-Ingest scraper.

use anyhow::Context;
use clap::Parser;
use novel_ingest::config::{
    load_config_with_hash, resolve_database_path, Config, DATABASE_ENV_VAR,
};
use novel_ingest::ingest::build_runner;
use novel_ingest::output::{
    load_progress_overview, print_progress_overview, print_report, write_report,
};
use novel_ingest::storage::open_store;
use novel_ingest::url::normalize_url;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Novel-Ingest: a resumable web novel scraper
///
/// Novel-Ingest fetches the metadata of every configured novel, then scrapes
/// the chapters it does not have yet into a SQLite progress store. Runs can
/// be interrupted at any point and pick up where the store left off.
#[derive(Parser, Debug)]
#[command(name = "novel-ingest")]
#[command(version = "1.0.0")]
#[command(about = "A resumable web novel scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and list the novels that would be ingested
    #[arg(long, conflicts_with = "status")]
    dry_run: bool,

    /// Show per-novel progress from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    status: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    let database_path = resolve_database_path(&config, std::env::var(DATABASE_ENV_VAR).ok())?;
    let database_path = PathBuf::from(database_path);

    if cli.status {
        handle_status(&database_path)
    } else {
        handle_ingest(&config, &config_hash, &database_path).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("novel_ingest=info,warn"),
            1 => EnvFilter::new("novel_ingest=debug,info"),
            2 => EnvFilter::new("novel_ingest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and lists the targets
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Novel-Ingest Dry Run ===\n");

    println!("Pacing:");
    println!("  Fetch delay: {}ms", config.ingest.fetch_delay_ms);
    println!("  Persist delay: {}ms", config.ingest.persist_delay_ms);
    println!("  Novel delay: {}ms", config.ingest.novel_delay_ms);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nStore:");
    match resolve_database_path(config, std::env::var(DATABASE_ENV_VAR).ok()) {
        Ok(path) => println!("  Database: {}", path),
        Err(_) => println!(
            "  Database: not set (set [store] database-path or {})",
            DATABASE_ENV_VAR
        ),
    }
    if let Some(dir) = &config.output.report_dir {
        println!("  Reports: {}", dir);
    }

    println!("\nChapter URL template: {}", config.site.chapter_url_template);

    println!("\nNovels ({}):", config.novels.len());
    for novel in &config.novels {
        let identity = normalize_url(&novel.url)?;
        println!("  - {}", novel.url);
        if identity.as_str() != novel.url {
            println!("    identity: {}", identity);
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would ingest {} novels", config.novels.len());

    Ok(())
}

/// Handles the --status mode: shows persisted progress from the database
fn handle_status(database_path: &Path) -> anyhow::Result<()> {
    println!("Database: {}\n", database_path.display());

    let store = open_store(database_path)?;
    let overview = load_progress_overview(&store)?;
    print_progress_overview(&overview);

    Ok(())
}

/// Handles the main ingestion run
async fn handle_ingest(
    config: &Config,
    config_hash: &str,
    database_path: &Path,
) -> anyhow::Result<()> {
    let mut runner = build_runner(config, config_hash, database_path)?;

    tracing::info!("Novels to ingest: {}", runner.targets().len());
    let stats = runner.run().await;

    print_report(&stats);

    if let Some(dir) = &config.output.report_dir {
        match write_report(&stats, Path::new(dir)) {
            Ok(path) => println!("✓ Report written to: {}", path.display()),
            Err(e) => tracing::warn!("Could not write report: {}", e),
        }
    }

    Ok(())
}
