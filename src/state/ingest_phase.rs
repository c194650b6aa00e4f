//! Phase definitions for a single novel's ingestion
//!
//! A novel moves `FetchingMetadata -> ResolvingTarget -> Ingesting -> Done`,
//! and may drop to `Skipped` from any phase that is not yet terminal.

use std::fmt;

/// Represents where one novel currently is in its ingestion run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IngestPhase {
    // ===== Active Phases =====
    /// Landing page is being fetched and its fields extracted
    FetchingMetadata,

    /// Declared chapter count is being turned into a numeric target
    ResolvingTarget,

    /// Chapter loop is running from the resume cursor to the target
    Ingesting,

    // ===== Terminal Phases =====
    /// Chapter loop exhausted (possibly with chapter-level failures)
    Done,

    /// Novel abandoned for this run; nothing after the failing step ran
    Skipped,
}

impl IngestPhase {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Skipped)
    }

    /// Returns true if the novel counts as processed for this run
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: IngestPhase) -> bool {
        match (self, next) {
            (Self::FetchingMetadata, Self::ResolvingTarget) => true,
            (Self::ResolvingTarget, Self::Ingesting) => true,
            (Self::Ingesting, Self::Done) => true,
            (from, Self::Skipped) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Stable lowercase name, used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchingMetadata => "fetching_metadata",
            Self::ResolvingTarget => "resolving_target",
            Self::Ingesting => "ingesting",
            Self::Done => "done",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for IngestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
