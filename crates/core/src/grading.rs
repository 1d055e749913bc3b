use crate::hints::ChoiceOption;
use crate::model::{Direction, Grade, HintsMode, WordSnapshot};

/// Lowercased, whitespace-trimmed form used for comparisons.
#[must_use]
pub fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Free-text check against every accepted answer for `direction`.
#[must_use]
pub fn matches_any(word: &WordSnapshot, direction: Direction, input: &str) -> bool {
    let answer = normalize(input);
    !answer.is_empty()
        && word
            .accepted_answers(direction)
            .iter()
            .any(|accepted| normalize(accepted) == answer)
}

/// Option the user picked, matched by label.
#[must_use]
pub fn chosen_option<'a>(options: &'a [ChoiceOption], input: &str) -> Option<&'a ChoiceOption> {
    let answer = normalize(input);
    options.iter().find(|o| normalize(&o.label) == answer)
}

/// Grades one answer.
///
/// - `Flashcards`: always correct; the user advances by self-report.
/// - `NoHints` and `Masked`: free-text membership in the accepted answers.
/// - `Test`: the picked option must come from `word` itself. Input matching no
///   presented option is wrong.
#[must_use]
pub fn grade(
    word: &WordSnapshot,
    direction: Direction,
    mode: HintsMode,
    input: &str,
    options: &[ChoiceOption],
) -> Grade {
    let correct = match mode {
        HintsMode::Flashcards => true,
        HintsMode::NoHints | HintsMode::Masked => matches_any(word, direction, input),
        HintsMode::Test => chosen_option(options, input).is_some_and(|o| o.token == word.word),
    };
    Grade::from_correct(correct)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gato() -> WordSnapshot {
        WordSnapshot::new("cat", vec!["gato".into(), "minino".into()])
    }

    #[test]
    fn free_text_is_trimmed_and_case_insensitive() {
        let g = grade(&gato(), Direction::From, HintsMode::NoHints, " Gato ", &[]);
        assert_eq!(g, Grade::Correct);
        let g = grade(&gato(), Direction::From, HintsMode::Masked, "MININO", &[]);
        assert_eq!(g, Grade::Correct);
    }

    #[test]
    fn free_text_uses_direction_side() {
        assert_eq!(
            grade(&gato(), Direction::From, HintsMode::NoHints, "cat", &[]),
            Grade::Incorrect
        );
        assert_eq!(
            grade(&gato(), Direction::To, HintsMode::NoHints, "Cat", &[]),
            Grade::Correct
        );
        assert_eq!(
            grade(&gato(), Direction::To, HintsMode::NoHints, "gato", &[]),
            Grade::Incorrect
        );
    }

    #[test]
    fn empty_answer_is_wrong() {
        assert_eq!(
            grade(&gato(), Direction::From, HintsMode::NoHints, "   ", &[]),
            Grade::Incorrect
        );
    }

    #[test]
    fn flashcards_always_pass() {
        assert_eq!(
            grade(&gato(), Direction::From, HintsMode::Flashcards, "/next", &[]),
            Grade::Correct
        );
    }

    #[test]
    fn test_mode_compares_option_token() {
        let house = WordSnapshot::new("house", vec!["casa".into()]);
        let options = vec![
            ChoiceOption { label: "perro".into(), token: "dog".into() },
            ChoiceOption { label: "casa".into(), token: "house".into() },
            ChoiceOption { label: "gato".into(), token: "cat".into() },
        ];
        assert_eq!(
            grade(&house, Direction::From, HintsMode::Test, "casa", &options),
            Grade::Correct
        );
        assert_eq!(
            grade(&house, Direction::From, HintsMode::Test, "perro", &options),
            Grade::Incorrect
        );
        assert_eq!(
            grade(&house, Direction::From, HintsMode::Test, "hogar", &options),
            Grade::Incorrect
        );
    }
}
