use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::options::Direction;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WordError {
    #[error("word text cannot be empty")]
    EmptyWord,

    #[error("word needs at least one translation")]
    NoTranslations,

    #[error("score sum ({score_sum}) exceeds trained count ({trained_count})")]
    ScoreExceedsCount { score_sum: u32, trained_count: u32 },
}

//
// ─── DIRECTION STATS ───────────────────────────────────────────────────────────
//

/// Long-term aggregate for one direction of one word.
///
/// Invariant: `score_sum <= trained_count`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionStats {
    score_sum: u32,
    trained_count: u32,
    last_trained: Option<DateTime<Utc>>,
}

impl DirectionStats {
    /// # Errors
    ///
    /// Returns `WordError::ScoreExceedsCount` if `score_sum > trained_count`.
    pub fn new(
        score_sum: u32,
        trained_count: u32,
        last_trained: Option<DateTime<Utc>>,
    ) -> Result<Self, WordError> {
        if score_sum > trained_count {
            return Err(WordError::ScoreExceedsCount {
                score_sum,
                trained_count,
            });
        }
        Ok(Self {
            score_sum,
            trained_count,
            last_trained,
        })
    }

    #[must_use]
    pub fn score_sum(&self) -> u32 {
        self.score_sum
    }

    #[must_use]
    pub fn trained_count(&self) -> u32 {
        self.trained_count
    }

    #[must_use]
    pub fn last_trained(&self) -> Option<DateTime<Utc>> {
        self.last_trained
    }

    /// `score_sum / trained_count`, or `None` if never trained.
    #[must_use]
    pub fn mastery(&self) -> Option<f64> {
        if self.trained_count == 0 {
            return None;
        }
        Some(f64::from(self.score_sum) / f64::from(self.trained_count))
    }

    /// Adds a batch delta. The score is clamped so the invariant holds.
    pub fn apply(&mut self, delta_score: u32, delta_count: u32, at: DateTime<Utc>) {
        self.trained_count = self.trained_count.saturating_add(delta_count);
        self.score_sum = self
            .score_sum
            .saturating_add(delta_score)
            .min(self.trained_count);
        self.last_trained = Some(at);
    }
}

//
// ─── WORD STATS ────────────────────────────────────────────────────────────────
//

/// A vocabulary entry together with its per-direction statistics.
///
/// Translations are ordered; the first one is the primary (display) form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordStats {
    pub word: String,
    pub translations: Vec<String>,
    pub to: DirectionStats,
    pub from: DirectionStats,
    pub created_at: DateTime<Utc>,
}

impl WordStats {
    /// A fresh, never trained entry.
    ///
    /// # Errors
    ///
    /// Returns `WordError` if the word or every translation is blank.
    pub fn new(
        word: impl Into<String>,
        translations: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, WordError> {
        let word = word.into().trim().to_lowercase();
        if word.is_empty() {
            return Err(WordError::EmptyWord);
        }
        let translations: Vec<String> = translations
            .into_iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if translations.is_empty() {
            return Err(WordError::NoTranslations);
        }
        Ok(Self {
            word,
            translations,
            to: DirectionStats::default(),
            from: DirectionStats::default(),
            created_at,
        })
    }

    #[must_use]
    pub fn stats(&self, direction: Direction) -> &DirectionStats {
        match direction {
            Direction::To => &self.to,
            Direction::From => &self.from,
        }
    }

    pub fn stats_mut(&mut self, direction: Direction) -> &mut DirectionStats {
        match direction {
            Direction::To => &mut self.to,
            Direction::From => &mut self.from,
        }
    }

    /// Average of the defined per-direction mastery ratios.
    #[must_use]
    pub fn overall_mastery(&self) -> Option<f64> {
        match (self.to.mastery(), self.from.mastery()) {
            (Some(a), Some(b)) => Some((a + b) / 2.0),
            (Some(a), None) | (None, Some(a)) => Some(a),
            (None, None) => None,
        }
    }

    #[must_use]
    pub fn total_trained(&self) -> u32 {
        self.to.trained_count().saturating_add(self.from.trained_count())
    }

    #[must_use]
    pub fn snapshot(&self) -> WordSnapshot {
        WordSnapshot {
            word: self.word.clone(),
            translations: self.translations.clone(),
        }
    }
}

//
// ─── SNAPSHOT ──────────────────────────────────────────────────────────────────
//

/// Word and translations frozen into a session at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordSnapshot {
    pub word: String,
    pub translations: Vec<String>,
}

impl WordSnapshot {
    #[must_use]
    pub fn new(word: impl Into<String>, translations: Vec<String>) -> Self {
        Self {
            word: word.into(),
            translations,
        }
    }

    /// Translations joined for display, e.g. `gato/minino`.
    #[must_use]
    pub fn translations_pretty(&self) -> String {
        self.translations.join("/")
    }

    /// Text shown as the question.
    #[must_use]
    pub fn prompt(&self, direction: Direction) -> String {
        match direction {
            Direction::From => self.word.clone(),
            Direction::To => self.translations_pretty(),
        }
    }

    /// Full expected answer as shown after a miss.
    #[must_use]
    pub fn answer(&self, direction: Direction) -> String {
        match direction {
            Direction::From => self.translations_pretty(),
            Direction::To => self.word.clone(),
        }
    }

    /// Primary answer form, used for masks and multiple-choice labels.
    #[must_use]
    pub fn primary_answer(&self, direction: Direction) -> &str {
        match direction {
            Direction::From => self.translations.first().map_or("", String::as_str),
            Direction::To => &self.word,
        }
    }

    /// Every answer accepted for free-text grading.
    #[must_use]
    pub fn accepted_answers(&self, direction: Direction) -> &[String] {
        match direction {
            Direction::From => &self.translations,
            Direction::To => std::slice::from_ref(&self.word),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
