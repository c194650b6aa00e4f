use std::fmt;

/// Why a novel was skipped for the current run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Landing page could not be fetched
    MetadataFetch(String),

    /// A required metadata field was not found on the landing page
    MissingField(String),

    /// Declared chapter count is not a positive integer
    InvalidChapterCount(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MetadataFetch(error) => write!(f, "metadata fetch failed: {}", error),
            Self::MissingField(field) => write!(f, "required field missing: {}", field),
            Self::InvalidChapterCount(raw) => {
                write!(f, "invalid declared chapter count: {:?}", raw)
            }
        }
    }
}
