//! Conversation state persisted between turns.
//!
//! Every turn starts by decoding this record and ends by writing the successor
//! back (or clearing it), so no process memory is needed between messages.

use serde::{Deserialize, Serialize};

use vocab_core::hints::ChoiceOption;
use vocab_core::model::{
    Direction, GroupRef, HintsMode, SessionDuration, Strategy, TrainingParams, TrainingSession,
};

/// Choices made before direction is picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub language: String,
    pub strategy: Strategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupRef>,
}

impl Selection {
    #[must_use]
    pub fn into_params(
        self,
        direction: Direction,
        duration: SessionDuration,
        hints: HintsMode,
    ) -> TrainingParams {
        TrainingParams {
            language: self.language,
            strategy: self.strategy,
            group: self.group,
            direction,
            duration,
            hints,
        }
    }
}

/// Parameter-gathering step awaiting the user's next choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Stage {
    Strategy {
        language: String,
    },
    Group {
        language: String,
    },
    Direction {
        selection: Selection,
    },
    Duration {
        selection: Selection,
        direction: Direction,
    },
    Hints {
        selection: Selection,
        direction: Direction,
        duration: SessionDuration,
    },
}

/// Position inside a running quiz.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuizCursor {
    /// Index of the word currently prompted, equal to the number already graded.
    pub step: usize,
    /// Options shown with the current prompt in `test` mode.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChoiceOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizState {
    pub session: TrainingSession,
    pub cursor: QuizCursor,
}

/// The `{state_tag, payload}` record kept in the conversation state store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state_tag", content = "payload", rename_all = "snake_case")]
pub enum ConversationState {
    Gathering(Stage),
    Quiz(QuizState),
}

impl ConversationState {
    /// # Errors
    ///
    /// Returns `serde_json::Error` if the record cannot be serialized.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// # Errors
    ///
    /// Returns `serde_json::Error` for malformed or incomplete blobs.
    pub fn decode(blob: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(blob)
    }
}
