//! Error types for visibility analysis and sky-grid rendering.

use thiserror::Error;

/// Errors raised by the visibility, contact and statistics pipeline.
///
/// All of these are configuration or programming errors surfaced
/// synchronously to the caller; none of them are transient.
#[derive(Error, Debug)]
pub enum VisibilityError {
    #[error("target '{target}' is in an invalid state: {reason}")]
    InvalidTargetState { target: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error(
        "mismatched timebase in '{owner}': '{item}' has {found} epochs \
         that do not match the {expected} epochs of the reference series"
    )]
    MismatchedTimebase {
        owner: String,
        item: String,
        expected: usize,
        found: usize,
    },

    #[error("not implemented: {0}")]
    Unimplemented(String),

    #[error("epoch index {index} out of range for '{name}' ({len} epochs)")]
    EpochOutOfRange {
        name: String,
        index: usize,
        len: usize,
    },

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by batch bitmap rendering.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Visibility(#[from] VisibilityError),

    #[error(
        "bitmap rendering failed for {} epoch(s): {}",
        .failures.len(),
        describe_failures(.failures)
    )]
    BatchFailed {
        /// Failed epoch indices with their error messages, in ascending index order
        failures: Vec<(usize, String)>,
    },

    #[error("bitmap rendering cancelled after {completed} of {total} epochs")]
    Cancelled { completed: usize, total: usize },

    #[error("failed to build rendering thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

fn describe_failures(failures: &[(usize, String)]) -> String {
    failures
        .iter()
        .map(|(index, msg)| format!("[{index}] {msg}"))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T, E = VisibilityError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_failed_lists_every_epoch() {
        let err = RenderError::BatchFailed {
            failures: vec![(2, "bad".to_string()), (7, "worse".to_string())],
        };
        let msg = err.to_string();
        assert!(msg.contains("2 epoch(s)"));
        assert!(msg.contains("[2] bad"));
        assert!(msg.contains("[7] worse"));
    }
}
