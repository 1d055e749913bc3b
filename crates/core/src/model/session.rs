use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{
    Direction, Grade, GroupId, HintsMode, OwnerId, SessionDuration, SessionId, Strategy,
    WordSnapshot,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionRecordError {
    #[error("session has no words")]
    Empty,

    #[error("strategy `group` requires a group")]
    MissingGroup,

    #[error("step {step} is out of range for {len} words")]
    StepOutOfRange { step: usize, len: usize },

    #[error("{grades} grades recorded before step {step}")]
    GradeCountMismatch { grades: usize, step: usize },
}

/// Group chosen for a `group` session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: GroupId,
    pub name: String,
}

/// Everything the user picked before the quiz starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingParams {
    pub language: String,
    pub strategy: Strategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupRef>,
    pub direction: Direction,
    pub duration: SessionDuration,
    pub hints: HintsMode,
}

/// A materialized training session.
///
/// The word list is a snapshot taken at creation; later vocabulary edits do not
/// reach an in-progress quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSession {
    id: SessionId,
    owner: OwnerId,
    created_at: DateTime<Utc>,
    params: TrainingParams,
    words: Vec<WordSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    distractors: Vec<WordSnapshot>,
    #[serde(default)]
    grades: Vec<Grade>,
}

impl TrainingSession {
    /// # Errors
    ///
    /// Returns `SessionRecordError::Empty` for an empty word list and
    /// `SessionRecordError::MissingGroup` for a group session without a group.
    pub fn new(
        id: SessionId,
        owner: OwnerId,
        created_at: DateTime<Utc>,
        params: TrainingParams,
        words: Vec<WordSnapshot>,
    ) -> Result<Self, SessionRecordError> {
        if words.is_empty() {
            return Err(SessionRecordError::Empty);
        }
        if params.strategy == Strategy::Group && params.group.is_none() {
            return Err(SessionRecordError::MissingGroup);
        }
        Ok(Self {
            id,
            owner,
            created_at,
            params,
            words,
            distractors: Vec::new(),
            grades: Vec::new(),
        })
    }

    /// Extra words used only as multiple-choice distractors.
    #[must_use]
    pub fn with_distractors(mut self, distractors: Vec<WordSnapshot>) -> Self {
        self.distractors = distractors;
        self
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn params(&self) -> &TrainingParams {
        &self.params
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.params.direction
    }

    #[must_use]
    pub fn hints(&self) -> HintsMode {
        self.params.hints
    }

    #[must_use]
    pub fn words(&self) -> &[WordSnapshot] {
        &self.words
    }

    #[must_use]
    pub fn distractors(&self) -> &[WordSnapshot] {
        &self.distractors
    }

    #[must_use]
    pub fn grades(&self) -> &[Grade] {
        &self.grades
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[must_use]
    pub fn word(&self, step: usize) -> Option<&WordSnapshot> {
        self.words.get(step)
    }

    /// Records the grade for the word at `step`, which must be the next ungraded one.
    ///
    /// # Errors
    ///
    /// Returns `SessionRecordError` if the record is inconsistent with `step`.
    pub fn record_grade(&mut self, step: usize, grade: Grade) -> Result<(), SessionRecordError> {
        self.check_step(step)?;
        self.grades.push(grade);
        Ok(())
    }

    /// Checks that a persisted record can resume at `step`.
    ///
    /// # Errors
    ///
    /// Returns `SessionRecordError` describing the first inconsistency found.
    pub fn check_step(&self, step: usize) -> Result<(), SessionRecordError> {
        if self.words.is_empty() {
            return Err(SessionRecordError::Empty);
        }
        if step >= self.words.len() {
            return Err(SessionRecordError::StepOutOfRange {
                step,
                len: self.words.len(),
            });
        }
        if self.grades.len() != step {
            return Err(SessionRecordError::GradeCountMismatch {
                grades: self.grades.len(),
                step,
            });
        }
        Ok(())
    }

    /// Words zipped with their grades; complete only when every word was graded.
    pub fn graded_words(&self) -> impl Iterator<Item = (&WordSnapshot, Grade)> {
        self.words.iter().zip(self.grades.iter().copied())
    }

    #[must_use]
    pub fn is_fully_graded(&self) -> bool {
        self.grades.len() == self.words.len()
    }
}
