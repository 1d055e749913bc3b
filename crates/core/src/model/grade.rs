use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid grade value: {0}")]
pub struct InvalidGrade(pub u8);

/// Outcome of one quiz answer.
///
/// Stored as `0`/`1`; any other value is rejected when a persisted cursor is read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Grade {
    Incorrect,
    Correct,
}

impl Grade {
    #[must_use]
    pub fn from_correct(correct: bool) -> Self {
        if correct { Grade::Correct } else { Grade::Incorrect }
    }

    #[must_use]
    pub fn is_correct(self) -> bool {
        matches!(self, Grade::Correct)
    }

    #[must_use]
    pub fn score(self) -> u32 {
        match self {
            Grade::Incorrect => 0,
            Grade::Correct => 1,
        }
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> Self {
        match grade {
            Grade::Incorrect => 0,
            Grade::Correct => 1,
        }
    }
}

impl TryFrom<u8> for Grade {
    type Error = InvalidGrade;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Grade::Incorrect),
            1 => Ok(Grade::Correct),
            other => Err(InvalidGrade(other)),
        }
    }
}

/// Running or final score of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub correct: u32,
    pub total: u32,
}

impl Tally {
    #[must_use]
    pub fn from_grades(grades: &[Grade], total: usize) -> Self {
        Self {
            correct: grades.iter().map(|g| g.score()).sum(),
            total: u32::try_from(total).unwrap_or(u32::MAX),
        }
    }
}
