use std::sync::Arc;

use tracing::{info, warn};

use storage::repository::{ConversationStateStore, Storage, VocabularyRepository};
use vocab_core::Clock;
use vocab_core::model::{OwnerId, WordStats};

use super::aggregator::aggregate;
use super::initiator::{Gathered, SessionInitiator};
use super::runner::{QuizStep, advance};
use super::state::{ConversationState, QuizState};
use crate::config::TrainingConfig;
use crate::error::SessionError;
use crate::reply::Reply;
use crate::texts;

/// Routes one incoming message of one owner through the training state machine.
///
/// Holds no per-owner memory; all progress lives in the conversation state store.
#[derive(Clone)]
pub struct TrainingService {
    clock: Clock,
    config: TrainingConfig,
    vocabulary: Arc<dyn VocabularyRepository>,
    states: Arc<dyn ConversationStateStore>,
}

impl TrainingService {
    #[must_use]
    pub fn new(
        clock: Clock,
        vocabulary: Arc<dyn VocabularyRepository>,
        states: Arc<dyn ConversationStateStore>,
    ) -> Self {
        Self {
            clock,
            config: TrainingConfig::default(),
            vocabulary,
            states,
        }
    }

    #[must_use]
    pub fn from_storage(clock: Clock, storage: &Storage) -> Self {
        Self::new(
            clock,
            Arc::clone(&storage.vocabulary),
            Arc::clone(&storage.states),
        )
    }

    #[must_use]
    pub fn with_config(mut self, config: TrainingConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    fn initiator(&self) -> SessionInitiator<'_> {
        SessionInitiator::new(self.vocabulary.as_ref(), self.clock, &self.config)
    }

    async fn save(&self, owner: OwnerId, state: &ConversationState) -> Result<(), SessionError> {
        let blob = state.encode()?;
        self.states.set(owner, &blob).await?;
        Ok(())
    }

    /// Starts parameter gathering, superseding any conversation in progress.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the state store fails.
    pub async fn start(
        &self,
        owner: OwnerId,
        language: Option<&str>,
    ) -> Result<Vec<Reply>, SessionError> {
        let Some(language) = language else {
            return Ok(vec![Reply::text(texts::NO_LANGUAGE_IS_SET)]);
        };
        if self.states.get(owner).await?.is_some() {
            info!(owner = %owner, "previous conversation superseded by new training");
        }
        let (stage, reply) = self.initiator().start(language);
        self.save(owner, &ConversationState::Gathering(stage)).await?;
        Ok(vec![reply])
    }

    /// Whether `owner` is in the middle of a training conversation.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the state store fails.
    pub async fn is_active(&self, owner: OwnerId) -> Result<bool, SessionError> {
        Ok(self.states.get(owner).await?.is_some())
    }

    /// Handles one message for `owner`.
    ///
    /// Corrupt persisted state is discarded and answered with a generic
    /// failure reply rather than an error.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when a store is unavailable; the turn may be retried.
    pub async fn handle(&self, owner: OwnerId, input: &str) -> Result<Vec<Reply>, SessionError> {
        let Some(blob) = self.states.get(owner).await? else {
            return Ok(vec![Reply::text(texts::UNKNOWN_MESSAGE)]);
        };
        let state = match ConversationState::decode(&blob) {
            Ok(state) => state,
            Err(err) => {
                warn!(owner = %owner, error = %err, "discarding undecodable conversation state");
                return self.discard(owner).await;
            }
        };

        match state {
            ConversationState::Gathering(stage) => {
                match self.initiator().handle(owner, stage, input).await? {
                    Gathered::Continue { stage, replies } => {
                        self.save(owner, &ConversationState::Gathering(stage))
                            .await?;
                        Ok(replies)
                    }
                    Gathered::Finished { replies } => {
                        self.states.clear(owner).await?;
                        Ok(replies)
                    }
                    Gathered::Started { quiz, replies } => {
                        self.save(owner, &ConversationState::Quiz(quiz)).await?;
                        Ok(replies)
                    }
                }
            }
            ConversationState::Quiz(quiz) => self.answer(owner, quiz, input).await,
        }
    }

    async fn answer(
        &self,
        owner: OwnerId,
        quiz: QuizState,
        input: &str,
    ) -> Result<Vec<Reply>, SessionError> {
        let QuizState { session, cursor } = quiz;
        if session.owner() != owner {
            warn!(owner = %owner, session_owner = %session.owner(), "session belongs to another owner");
            return self.discard(owner).await;
        }
        let session_id = session.id();

        let step = match advance(session, cursor, input, &self.config) {
            Ok(step) => step,
            Err(err) => {
                warn!(owner = %owner, session = %session_id, error = %err, "aborting corrupt session");
                return self.discard(owner).await;
            }
        };

        match step {
            QuizStep::Next {
                session,
                cursor,
                replies,
            } => {
                self.save(owner, &ConversationState::Quiz(QuizState { session, cursor }))
                    .await?;
                Ok(replies)
            }
            QuizStep::Aborted {
                session_id,
                step,
                replies,
            } => {
                self.states.clear(owner).await?;
                info!(owner = %owner, session = %session_id, step, "training session stopped");
                Ok(replies)
            }
            QuizStep::Complete {
                session_id,
                tally,
                batch,
                replies,
            } => {
                // The state is gone before the batch is applied.
                self.states.clear(owner).await?;
                let saved = match batch {
                    Some(batch) => aggregate(self.vocabulary.as_ref(), batch).await? > 0,
                    None => false,
                };
                info!(
                    owner = %owner,
                    session = %session_id,
                    correct = tally.correct,
                    total = tally.total,
                    saved,
                    "training session complete"
                );
                Ok(replies)
            }
        }
    }

    async fn discard(&self, owner: OwnerId) -> Result<Vec<Reply>, SessionError> {
        self.states.clear(owner).await?;
        Ok(vec![Reply::text(texts::SESSION_BROKEN)])
    }

    /// Words of `language` sorted alphabetically, for the mastery listing.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the vocabulary store fails.
    pub async fn words(
        &self,
        owner: OwnerId,
        language: &str,
    ) -> Result<Vec<WordStats>, SessionError> {
        let mut words = self.vocabulary.fetch_candidates(owner, language).await?;
        words.sort_by(|a, b| a.word.cmp(&b.word));
        Ok(words)
    }
}
