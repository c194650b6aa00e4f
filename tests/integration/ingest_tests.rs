//! Integration tests for the ingestion pipeline
//!
//! These tests use wiremock to serve a small novel site and run the full
//! batch (HTTP fetcher, HTML extractor, SQLite store) end-to-end.

use novel_ingest::config::{
    resolve_database_path, Config, IngestConfig, NovelTarget, OutputConfig, SelectorConfig,
    SiteConfig, StoreConfig, UserAgentConfig,
};
use novel_ingest::ingest::{build_runner, build_runner_with_pacer, Unpaced};
use novel_ingest::output::{format_report, write_report, NovelResult};
use novel_ingest::storage::{open_store, ProgressStore, RunStatus};
use novel_ingest::{ConfigError, IngestError};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for the given novel URLs
fn create_test_config(novel_urls: Vec<String>, db_path: Option<&Path>) -> Config {
    Config {
        ingest: IngestConfig {
            fetch_delay_ms: 100,
            persist_delay_ms: 0,
            novel_delay_ms: 0,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        store: StoreConfig {
            database_path: db_path.map(|p| p.display().to_string()),
        },
        output: OutputConfig { report_dir: None },
        site: SiteConfig::default(),
        selectors: SelectorConfig::default(),
        novels: novel_urls
            .into_iter()
            .map(|url| NovelTarget { url })
            .collect(),
    }
}

fn landing_page(title: &str, declared: &str, list_href: &str) -> String {
    format!(
        r#"<html><head><title>{title}</title></head><body>
        <h1 class="novel-title">{title}</h1>
        <div class="author">Test Author</div>
        <div class="header-stats">
          <span class="chapters">{declared} Chapters</span>
          <span class="status">Completed</span>
        </div>
        <div class="categories"><a href="/g/1">Fantasy</a><a href="/g/2">Drama</a></div>
        <div class="summary"><div class="content">A test novel.</div></div>
        <a class="chapter-list-link" href="{list_href}">Chapters</a>
        </body></html>"#
    )
}

fn chapter_page(number: u32) -> String {
    format!(
        r#"<html><body>
        <h2 class="chapter-title">Chapter {number}: Part {number}</h2>
        <div id="chapter-container"><p>Paragraph one of {number}.</p><p>Paragraph two.</p></div>
        </body></html>"#
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

async fn mount_novel(server: &MockServer, slug: &str, declared: &str, chapters: u32) {
    Mock::given(method("GET"))
        .and(path(format!("/novel/{}", slug)))
        .respond_with(html(landing_page(
            &format!("Novel {}", slug),
            declared,
            &format!("/novel/{}/", slug),
        )))
        .mount(server)
        .await;

    for number in 1..=chapters {
        Mock::given(method("GET"))
            .and(path(format!("/novel/{}/chapter-{}", slug, number)))
            .respond_with(html(chapter_page(number)))
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn test_end_to_end_single_novel() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("progress.db");

    mount_novel(&server, "x", "3", 3).await;
    let novel_url = format!("{}/novel/x", server.uri());
    let config = create_test_config(vec![novel_url.clone()], Some(&db_path));

    let mut runner =
        build_runner_with_pacer(&config, "test-hash", &db_path, Arc::new(Unpaced)).unwrap();
    let stats = runner.run().await;

    assert_eq!(stats.novels_processed, 1);
    assert_eq!(stats.novels_skipped, 0);
    assert_eq!(stats.novels_failed, 0);
    assert_eq!(stats.chapters.attempted, 3);
    assert_eq!(stats.chapters.succeeded, 3);
    assert_eq!(stats.chapters.errored, 0);
    assert_eq!(stats.chapters.persisted, 3);

    // Reopen the database from disk
    drop(runner);
    let store = open_store(&db_path).unwrap();
    assert_eq!(store.count_novels().unwrap(), 1);
    assert_eq!(store.count_chapters().unwrap(), 3);

    let novel = store.get_novel_by_identity(&novel_url).unwrap().unwrap();
    assert_eq!(novel.metadata.title, "Novel x");
    assert_eq!(novel.metadata.author.as_deref(), Some("Test Author"));
    assert_eq!(novel.metadata.declared_chapters, "3 Chapters");
    assert_eq!(novel.metadata.genres, vec!["Fantasy", "Drama"]);
    assert_eq!(
        novel.metadata.chapter_list_url,
        format!("{}/novel/x/", server.uri())
    );

    let references = store.chapter_references(novel.id).unwrap();
    assert_eq!(references.len(), 3);
    for number in 1..=3 {
        let chapter = store.get_chapter(novel.id, number).unwrap().unwrap();
        assert!(references.contains(&chapter.id));
        assert_eq!(chapter.content.title, format!("Chapter {}: Part {}", number, number));
        assert_eq!(
            chapter.content.body,
            format!("Paragraph one of {}.\n\nParagraph two.", number)
        );
        assert_eq!(
            chapter.content.url,
            format!("{}/novel/x/chapter-{}", server.uri(), number)
        );
    }

    let run = store.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "test-hash");
}

#[tokio::test]
async fn test_rerun_fetches_no_chapters() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("progress.db");

    Mock::given(method("GET"))
        .and(path("/novel/x"))
        .respond_with(html(landing_page("Novel x", "2", "/novel/x")))
        .expect(2)
        .mount(&server)
        .await;
    for number in 1..=2 {
        Mock::given(method("GET"))
            .and(path(format!("/novel/x/chapter-{}", number)))
            .respond_with(html(chapter_page(number)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let config = create_test_config(vec![format!("{}/novel/x", server.uri())], Some(&db_path));

    for _ in 0..2 {
        let mut runner =
            build_runner_with_pacer(&config, "hash", &db_path, Arc::new(Unpaced)).unwrap();
        runner.run().await;
    }

    let store = open_store(&db_path).unwrap();
    assert_eq!(store.count_novels().unwrap(), 1);
    assert_eq!(store.count_chapters().unwrap(), 2);

    // Expectations on the mocks are verified when the server drops
    server.verify().await;
}

#[tokio::test]
async fn test_trailing_failure_is_retried_next_run() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("progress.db");

    // Chapter 3 fails once, then succeeds
    Mock::given(method("GET"))
        .and(path("/novel/x/chapter-3"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_novel(&server, "x", "3", 3).await;

    let config = create_test_config(vec![format!("{}/novel/x", server.uri())], Some(&db_path));

    let mut runner = build_runner_with_pacer(&config, "hash", &db_path, Arc::new(Unpaced)).unwrap();
    let first = runner.run().await;
    assert_eq!(first.chapters.attempted, 3);
    assert_eq!(first.chapters.errored, 1);
    assert_eq!(runner.store().count_chapters().unwrap(), 2);

    let second = runner.run().await;
    assert_eq!(second.chapters.attempted, 1);
    assert_eq!(second.chapters.succeeded, 1);
    assert_eq!(runner.store().count_chapters().unwrap(), 3);
}

#[tokio::test]
async fn test_batch_isolates_broken_novel() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("progress.db");

    mount_novel(&server, "a", "2", 2).await;
    mount_novel(&server, "c", "1", 1).await;
    // Novel b has no landing page mock and 404s

    let config = create_test_config(
        vec![
            format!("{}/novel/a", server.uri()),
            format!("{}/novel/b", server.uri()),
            format!("{}/novel/c", server.uri()),
        ],
        Some(&db_path),
    );

    let mut runner = build_runner_with_pacer(&config, "hash", &db_path, Arc::new(Unpaced)).unwrap();
    let stats = runner.run().await;

    assert_eq!(stats.novels_processed, 2);
    assert_eq!(stats.novels_skipped, 1);
    assert_eq!(stats.chapters.succeeded, 3);
    assert!(matches!(stats.novels[1].result, NovelResult::Skipped(_)));
    assert_eq!(runner.store().count_novels().unwrap(), 2);

    let report = format_report(&stats);
    assert!(report.contains("Processed: 2"));
    assert!(report.contains("404"));

    let report_path = write_report(&stats, &temp.path().join("reports")).unwrap();
    assert!(report_path.exists());
}

#[test]
fn test_missing_store_path_is_fatal() {
    let config = create_test_config(vec!["https://example.com/novel/x".to_string()], None);

    let result = resolve_database_path(&config, None);
    assert!(matches!(result, Err(ConfigError::MissingValue(_))));

    let from_env = resolve_database_path(&config, Some("/tmp/from-env.db".to_string())).unwrap();
    assert_eq!(from_env, "/tmp/from-env.db");
}

#[test]
fn test_unopenable_store_is_startup_error() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("missing-dir").join("progress.db");
    let config =
        create_test_config(vec!["https://example.com/novel/x".to_string()], Some(&db_path));

    let result = build_runner(&config, "hash", &db_path);
    assert!(matches!(result, Err(IngestError::Startup(_))));
}
