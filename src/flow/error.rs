//! Flow error types.

use thiserror::Error;

use crate::crew::CrewError;

/// Result type for flow operations.
pub type FlowResult<T> = Result<T, FlowError>;

/// Errors that end a blog generation run.
///
/// All variants are terminal: this layer never retries, and whatever was
/// already persisted to disk stays there.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Invalid invocation; surfaced before any side effects.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The planning crew failed or returned an unusable roadmap.
    #[error("Planning failed: {0}")]
    Planning(#[source] CrewError),

    /// The writing crew failed for a specific post. Posts before `index`
    /// remain on disk; later indices were never attempted.
    #[error("Writing post {} of {} failed: {}", .index + 1, .total, .source)]
    Writing {
        /// Zero-based roadmap index of the failed post
        index: usize,
        /// Total number of planned posts
        total: usize,
        #[source]
        source: CrewError,
    },

    /// A loaded roadmap document yielded no usable outlines.
    #[error("Malformed roadmap document: {0}")]
    MalformedRoadmap(String),

    /// Artifact persistence failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writing_error_reports_one_based_position() {
        let err = FlowError::Writing { index: 2, total: 5, source: CrewError::EmptyRoadmap };
        assert!(err.to_string().contains("post 3 of 5"));
    }
}
