//! State module for tracking per-novel ingestion progress
//!
//! # Components
//!
//! - `IngestPhase`: the phase a novel is in during one run
//! - `SkipReason`: why a novel was abandoned for this run

mod ingest_phase;
mod skip_reason;

pub use ingest_phase::IngestPhase;
pub use skip_reason::SkipReason;
