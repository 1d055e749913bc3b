//! User-facing strings of the training conversation.

use vocab_core::model::{Tally, TrainingSession, WordStats};

pub const NO_LANGUAGE_IS_SET: &str = "Language not set. Set it with command /set_language.";

pub const UNKNOWN_MESSAGE: &str = "I don't know what to do :(";

pub const TRAINING_INIT: &str = "Choose training strategy.\n\
    Now available:\n\n\
    - random - simply random words\n\
    - new - only words that you've seen not more than 2 times\n\
    - bad - only words with weak score\n\
    - group - words from a particular group";

pub const TRAINING_GROUP: &str = "Choose one of your groups";

pub const TRAINING_DIRECTION: &str =
    "Choose training direction: to ➡️, or from ⬅️ your current language";

pub const TRAINING_DURATION: &str =
    "Choose duration of your training. You can also type in any number.";

pub const TRAINING_HINTS: &str = "Choose hints for your training.\n\
    Training with hints will not affect your word scores. Choose 'no hints' to track your progress.";

pub const STRATEGY_UNKNOWN: &str = "This strategy is not supported, choose again.";

pub const DIRECTION_UNKNOWN: &str = "This direction is not supported, choose again.";

pub const DURATION_UNKNOWN: &str = "This duration is not supported, choose again.";

pub const HINTS_UNKNOWN: &str = "These hints are not supported, choose again.";

pub const NO_SUCH_GROUP: &str = "You don't have a group with that name, choose again.";

pub const NO_GROUPS_YET: &str = "You don't have any groups yet, try /create_group";

pub const TRAINING_CANCELLED: &str = "Cancelled training, come back soon and /train again!";

pub const TRAINING_STOPPED: &str = "Session stopped, results not saved.\nLet's /train again?";

pub const NO_WORDS_FOUND: &str =
    "There are no words satisfying your parameters, try choosing something else: /train";

pub const FEWER_WORDS: &str = "(I have found fewer words than you have requested)";

pub const NO_SCORES: &str = "Scores are not saved because hints were used.";

pub const CORRECT_ANSWER: &str = "✅";

pub const SESSION_BROKEN: &str =
    "Something went wrong with this training session, it was discarded. Please /train again.";

pub const NO_WORDS_YET: &str = "You don't have any words yet, try /add_words!";

#[must_use]
pub fn wrong_answer(answer: &str) -> String {
    format!("❌ {answer}")
}

#[must_use]
pub fn results(tally: Tally) -> String {
    format!(
        "Score: {} / {}\n🎉 Training complete!\nLet's /train again?",
        tally.correct, tally.total
    )
}

#[must_use]
pub fn training_start(session: &TrainingSession) -> String {
    let params = session.params();
    let mut text = format!(
        "Starting training.\nStrategy: {}\nDuration: {}\nDirection: {}\nHints: {}",
        params.strategy,
        session.len(),
        params.direction,
        params.hints
    );
    if let Some(group) = &params.group {
        text.push_str(&format!("\n\nGroup name: {}", group.name));
    }
    text
}

/// One line per word: mastery percentage, training count, word and translations.
#[must_use]
pub fn word_listing(language: &str, words: &[WordStats]) -> String {
    if words.is_empty() {
        return NO_WORDS_YET.to_owned();
    }
    let mut text = format!("You have {} word(s) for language '{language}'.\n\n", words.len());
    text.push_str("    %    #  word\n");
    for word in words {
        let mastery = word
            .overall_mastery()
            .map_or_else(|| "   -".to_owned(), |m| format!("{:>4.0}", m * 100.0));
        text.push_str(&format!(
            "{mastery} {:>4}  {} - {}\n",
            word.total_trained(),
            word.word,
            word.translations.join("/")
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocab_core::model::DirectionStats;
    use vocab_core::time::fixed_now;

    #[test]
    fn listing_shows_mastery_and_count() {
        let mut cat = WordStats::new("cat", vec!["gato".into()], fixed_now()).unwrap();
        cat.from = DirectionStats::new(3, 4, None).unwrap();
        let fresh = WordStats::new("dog", vec!["perro".into()], fixed_now()).unwrap();

        let text = word_listing("es", &[cat, fresh]);
        assert!(text.starts_with("You have 2 word(s) for language 'es'."));
        assert!(text.contains("  75    4  cat - gato"));
        assert!(text.contains("   -    0  dog - perro"));
    }

    #[test]
    fn empty_listing_points_to_add_words() {
        assert_eq!(word_listing("es", &[]), NO_WORDS_YET);
    }
}
