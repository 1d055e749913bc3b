use tracing::debug;

use storage::repository::{ScoreUpdate, StorageError, VocabularyRepository};
use vocab_core::model::{Direction, OwnerId, SessionId, TrainingSession};

/// Statistics delta of one completed session.
///
/// Not `Clone`. [`aggregate`] consumes it, at most once per session.
#[derive(Debug, PartialEq, Eq)]
pub struct ScoreBatch {
    session_id: SessionId,
    owner: OwnerId,
    language: String,
    direction: Direction,
    updates: Vec<ScoreUpdate>,
}

impl ScoreBatch {
    /// Builds the batch for a fully graded session; `None` otherwise.
    pub(crate) fn from_session(session: &TrainingSession) -> Option<Self> {
        if !session.is_fully_graded() {
            return None;
        }
        let updates = session
            .graded_words()
            .map(|(word, grade)| ScoreUpdate {
                word: word.word.clone(),
                delta_score: grade.score(),
                delta_count: 1,
                timestamp: session.created_at(),
            })
            .collect();
        Some(Self {
            session_id: session.id(),
            owner: session.owner(),
            language: session.params().language.clone(),
            direction: session.direction(),
            updates,
        })
    }

    #[must_use]
    pub fn updates(&self) -> &[ScoreUpdate] {
        &self.updates
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

/// Folds a completed session into long-term statistics with one bulk update.
///
/// # Errors
///
/// Returns `StorageError` if the store rejects the batch.
pub async fn aggregate(
    vocabulary: &dyn VocabularyRepository,
    batch: ScoreBatch,
) -> Result<usize, StorageError> {
    if batch.is_empty() {
        return Ok(0);
    }
    vocabulary
        .apply_score_updates(batch.owner, &batch.language, batch.direction, batch.updates())
        .await?;
    debug!(
        owner = %batch.owner,
        session = %batch.session_id,
        words = batch.len(),
        "score batch applied"
    );
    Ok(batch.len())
}
