use serde::{Deserialize, Serialize};

use vocab_core::hints::DEFAULT_MAX_DISTRACTORS;

/// Tunables for a training conversation.
///
/// Missing fields fall back to the defaults, so a partial JSON file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Word count used when the user picks `All`.
    pub max_words: u32,
    /// Wrong options offered per `test` prompt.
    pub max_distractors: usize,
    pub stop_command: String,
    pub cancel_command: String,
    pub next_command: String,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            max_words: 1000,
            max_distractors: DEFAULT_MAX_DISTRACTORS,
            stop_command: "/stop".into(),
            cancel_command: "/cancel".into(),
            next_command: "/next".into(),
        }
    }
}

impl TrainingConfig {
    #[must_use]
    pub fn is_stop(&self, input: &str) -> bool {
        input.trim() == self.stop_command
    }

    #[must_use]
    pub fn is_cancel(&self, input: &str) -> bool {
        input.trim() == self.cancel_command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: TrainingConfig = serde_json::from_str(r#"{"max_words": 50}"#).unwrap();
        assert_eq!(cfg.max_words, 50);
        assert_eq!(cfg.max_distractors, 3);
        assert_eq!(cfg.stop_command, "/stop");
    }

    #[test]
    fn commands_ignore_surrounding_whitespace() {
        let cfg = TrainingConfig::default();
        assert!(cfg.is_stop(" /stop\n"));
        assert!(cfg.is_cancel("/cancel"));
        assert!(!cfg.is_stop("/Stop"));
    }
}
