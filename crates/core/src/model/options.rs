use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// A training option typed by the user did not match any offered choice.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseOptionError {
    #[error("unknown strategy: {0}")]
    Strategy(String),

    #[error("unknown direction: {0}")]
    Direction(String),

    #[error("unsupported duration: {0}")]
    Duration(String),

    #[error("unknown hints mode: {0}")]
    Hints(String),
}

//
// ─── DIRECTION ─────────────────────────────────────────────────────────────────
//

/// Which side of a word/translation pair is shown as the prompt.
///
/// - `From`: prompt the word, expect a translation.
/// - `To`: prompt the translations, expect the word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    To,
    From,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::To, Direction::From];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::To => "to",
            Direction::From => "from",
        }
    }

    /// Label offered on the direction keyboard.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Direction::To => "to ➡️",
            Direction::From => "from ⬅️",
        }
    }

    /// Accepts the keyboard label or the bare wire name.
    ///
    /// # Errors
    ///
    /// Returns `ParseOptionError::Direction` for anything else.
    pub fn parse(input: &str) -> Result<Self, ParseOptionError> {
        let trimmed = input.trim();
        Self::ALL
            .into_iter()
            .find(|d| trimmed == d.label() || trimmed.eq_ignore_ascii_case(d.as_str()))
            .ok_or_else(|| ParseOptionError::Direction(trimmed.to_owned()))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── STRATEGY ──────────────────────────────────────────────────────────────────
//

/// Word selection policy for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Any word.
    Random,
    /// Words trained at most twice in the chosen direction.
    New,
    /// Trained words with a mastery ratio of at most 0.7.
    Bad,
    /// Members of one word group.
    Group,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Random,
        Strategy::New,
        Strategy::Bad,
        Strategy::Group,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Random => "random",
            Strategy::New => "new",
            Strategy::Bad => "bad",
            Strategy::Group => "group",
        }
    }

    /// # Errors
    ///
    /// Returns `ParseOptionError::Strategy` if `input` names no strategy.
    pub fn parse(input: &str) -> Result<Self, ParseOptionError> {
        let trimmed = input.trim();
        Self::ALL
            .into_iter()
            .find(|s| trimmed.eq_ignore_ascii_case(s.as_str()))
            .ok_or_else(|| ParseOptionError::Strategy(trimmed.to_owned()))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── HINTS MODE ────────────────────────────────────────────────────────────────
//

/// How much help a quiz turn gives. Only `NoHints` sessions are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HintsMode {
    #[serde(rename = "no hints")]
    NoHints,
    /// First and last letter shown, the rest masked.
    #[serde(rename = "a****z")]
    Masked,
    /// Multiple choice.
    #[serde(rename = "test")]
    Test,
    #[serde(rename = "flashcards")]
    Flashcards,
}

impl HintsMode {
    /// Keyboard order of the hint choices.
    pub const ALL: [HintsMode; 4] = [
        HintsMode::Flashcards,
        HintsMode::Test,
        HintsMode::Masked,
        HintsMode::NoHints,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HintsMode::NoHints => "no hints",
            HintsMode::Masked => "a****z",
            HintsMode::Test => "test",
            HintsMode::Flashcards => "flashcards",
        }
    }

    /// Whether a completed session in this mode updates long-term statistics.
    #[must_use]
    pub fn persists_scores(self) -> bool {
        matches!(self, HintsMode::NoHints)
    }

    /// # Errors
    ///
    /// Returns `ParseOptionError::Hints` if `input` names no hints mode.
    pub fn parse(input: &str) -> Result<Self, ParseOptionError> {
        let trimmed = input.trim();
        Self::ALL
            .into_iter()
            .find(|h| trimmed.eq_ignore_ascii_case(h.as_str()))
            .ok_or_else(|| ParseOptionError::Hints(trimmed.to_owned()))
    }
}

impl fmt::Display for HintsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── DURATION ──────────────────────────────────────────────────────────────────
//

/// Requested number of words in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionDuration {
    Words(u32),
    /// As many as the vocabulary allows, capped by configuration.
    All,
}

impl SessionDuration {
    /// Preset labels offered on the duration keyboard. Any positive number is accepted too.
    pub const PRESETS: [&'static str; 3] = ["10", "20", "All"];

    /// Number of words to select, with `All` mapped to `max_words`.
    #[must_use]
    pub fn resolve(self, max_words: u32) -> u32 {
        match self {
            SessionDuration::Words(n) => n,
            SessionDuration::All => max_words,
        }
    }

    /// Whether the user asked for an explicit count (and should be told when fewer were found).
    #[must_use]
    pub fn is_explicit(self) -> bool {
        matches!(self, SessionDuration::Words(_))
    }

    /// # Errors
    ///
    /// Returns `ParseOptionError::Duration` unless `input` is `All` or a positive integer.
    pub fn parse(input: &str) -> Result<Self, ParseOptionError> {
        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(SessionDuration::All);
        }
        match trimmed.parse::<u32>() {
            Ok(n) if n > 0 => Ok(SessionDuration::Words(n)),
            _ => Err(ParseOptionError::Duration(trimmed.to_owned())),
        }
    }
}

impl fmt::Display for SessionDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionDuration::Words(n) => write!(f, "{n}"),
            SessionDuration::All => f.write_str("All"),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_accepts_label_and_name() {
        assert_eq!(Direction::parse("to ➡️").unwrap(), Direction::To);
        assert_eq!(Direction::parse(" FROM ").unwrap(), Direction::From);
        assert!(matches!(
            Direction::parse("sideways"),
            Err(ParseOptionError::Direction(_))
        ));
    }

    #[test]
    fn strategy_and_hints_parse_known_names() {
        assert_eq!(Strategy::parse("bad").unwrap(), Strategy::Bad);
        assert_eq!(HintsMode::parse("a****z").unwrap(), HintsMode::Masked);
        assert_eq!(HintsMode::parse("no hints").unwrap(), HintsMode::NoHints);
        assert!(Strategy::parse("smart").is_err());
        assert!(HintsMode::parse("lots").is_err());
    }

    #[test]
    fn duration_parses_presets_and_numbers() {
        assert_eq!(SessionDuration::parse("All").unwrap(), SessionDuration::All);
        assert_eq!(
            SessionDuration::parse("15").unwrap(),
            SessionDuration::Words(15)
        );
        assert!(SessionDuration::parse("0").is_err());
        assert!(SessionDuration::parse("-3").is_err());
        assert!(SessionDuration::parse("ten").is_err());
    }

    #[test]
    fn duration_resolves_all_to_cap() {
        assert_eq!(SessionDuration::All.resolve(500), 500);
        assert_eq!(SessionDuration::Words(7).resolve(500), 7);
        assert!(!SessionDuration::All.is_explicit());
    }

    #[test]
    fn only_no_hints_persists() {
        assert!(HintsMode::NoHints.persists_scores());
        assert!(!HintsMode::Flashcards.persists_scores());
        assert!(!HintsMode::Test.persists_scores());
        assert!(!HintsMode::Masked.persists_scores());
    }

    #[test]
    fn hints_mode_uses_wire_names() {
        let json = serde_json::to_string(&HintsMode::Masked).unwrap();
        assert_eq!(json, "\"a****z\"");
    }
}
