//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use vocab_core::model::SessionRecordError;

/// Errors emitted by `TrainingService`.
///
/// Every variant is fatal for the current turn only; the caller may retry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to encode conversation state: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Record(#[from] SessionRecordError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
}

/// Errors from a single quiz transition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("corrupt quiz state: {0}")]
    CorruptState(String),
}

impl From<SessionRecordError> for QuizError {
    fn from(err: SessionRecordError) -> Self {
        QuizError::CorruptState(err.to_string())
    }
}
