//! Batch runner
//!
//! Walks the configured novel list strictly in order, one novel at a time,
//! with a pause between novels. Whatever happens to one novel (a skip, an
//! error, a panic) is recorded and the runner moves on to the next.

use crate::config::NovelTarget;
use crate::ingest::orchestrator::Ingestor;
use crate::ingest::pacing::Throttle;
use crate::output::RunStatistics;
use crate::storage::{ProgressStore, RunStatus};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{error, info, warn};

/// Runs every configured novel through an [`Ingestor`]
pub struct BatchRunner<S: ProgressStore> {
    ingestor: Ingestor<S>,
    targets: Vec<NovelTarget>,
    novel_gap: Throttle,
    config_hash: String,
}

impl<S: ProgressStore> BatchRunner<S> {
    pub fn new(ingestor: Ingestor<S>, targets: Vec<NovelTarget>, novel_gap: Throttle) -> Self {
        Self {
            ingestor,
            targets,
            novel_gap,
            config_hash: String::new(),
        }
    }

    /// Sets the configuration hash stored with the run record
    pub fn with_config_hash(mut self, config_hash: impl Into<String>) -> Self {
        self.config_hash = config_hash.into();
        self
    }

    pub fn targets(&self) -> &[NovelTarget] {
        &self.targets
    }

    pub fn store(&self) -> &S {
        self.ingestor.store()
    }

    /// Ingests every novel and returns the run's statistics
    ///
    /// Never fails: per-novel errors and panics are counted as failed
    /// novels, and a run record that cannot be written is only logged.
    pub async fn run(&mut self) -> RunStatistics {
        let mut stats = RunStatistics::new();
        let total = self.targets.len();

        let run_id = match self.ingestor.store_mut().create_run(&self.config_hash) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("Could not record run start: {}", e);
                None
            }
        };

        info!("Starting ingestion of {} novels", total);

        for (index, target) in self.targets.iter().enumerate() {
            if index > 0 {
                self.novel_gap.ready().await;
            }
            info!("[{}/{}] {}", index + 1, total, target.url);

            let result = AssertUnwindSafe(self.ingestor.ingest_novel(target, &mut stats))
                .catch_unwind()
                .await;

            match result {
                Ok(Ok(outcome)) => stats.record_novel(&outcome),
                Ok(Err(e)) => {
                    error!("Ingestion of {} failed: {}", target.url, e);
                    stats.record_failed_novel(&target.url, e.to_string());
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    error!("Ingestion of {} panicked: {}", target.url, message);
                    stats.record_failed_novel(&target.url, format!("panic: {}", message));
                }
            }

            self.novel_gap.mark();
        }

        stats.finish();

        // A run in which not a single novel got through is recorded as failed
        let status = if total > 0 && stats.novels_failed == total as u64 {
            RunStatus::Failed
        } else {
            RunStatus::Completed
        };

        if let Some(run_id) = run_id {
            if let Err(e) = self.ingestor.store_mut().finish_run(run_id, status) {
                warn!("Could not record run completion: {}", e);
            }
        }

        info!(
            "Run finished: {} processed, {} skipped, {} failed",
            stats.novels_processed, stats.novels_skipped, stats.novels_failed
        );

        stats
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
