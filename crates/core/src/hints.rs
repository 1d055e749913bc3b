//! Hints shown alongside a quiz prompt.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::grading::normalize;
use crate::model::{Direction, HintsMode, WordSnapshot};

/// Answers of this many characters or fewer are masked completely.
pub const FULL_MASK_MAX_LEN: usize = 4;

/// Default number of wrong options in `test` mode.
pub const DEFAULT_MAX_DISTRACTORS: usize = 3;

/// One multiple-choice option.
///
/// `label` is what the user sees and types back; `token` is the word key of the
/// entry the label came from, used for grading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub label: String,
    pub token: String,
}

/// Hint attached to a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum HintPayload {
    None,
    Masked(String),
    Choices(Vec<ChoiceOption>),
    Reveal(String),
}

/// Masks the interior of `answer`: `elephant` becomes `e******t`.
#[must_use]
pub fn mask(answer: &str) -> String {
    let chars: Vec<char> = answer.chars().collect();
    if chars.len() <= FULL_MASK_MAX_LEN {
        return "*".repeat(chars.len());
    }
    let mut out = String::with_capacity(answer.len());
    out.push(chars[0]);
    out.push_str(&"*".repeat(chars.len() - 2));
    out.push(chars[chars.len() - 1]);
    out
}

/// Builds the shuffled option set for `word`.
///
/// Distractors come from `siblings` first and `fallback` after that, skipping the
/// word itself and any entry whose label would duplicate one already chosen.
/// `seed` fixes both the distractor pick and the final order.
#[must_use]
pub fn choices(
    word: &WordSnapshot,
    direction: Direction,
    siblings: &[WordSnapshot],
    fallback: &[WordSnapshot],
    max_distractors: usize,
    seed: u64,
) -> Vec<ChoiceOption> {
    let mut rng = StdRng::seed_from_u64(seed);
    let correct = ChoiceOption {
        label: word.primary_answer(direction).to_owned(),
        token: word.word.clone(),
    };

    let mut pool: Vec<&WordSnapshot> = siblings
        .iter()
        .filter(|s| s.word != word.word)
        .collect();
    pool.shuffle(&mut rng);

    let mut options: Vec<ChoiceOption> = Vec::with_capacity(max_distractors + 1);
    // Labels are compared in graded form so no two options answer alike.
    let correct_key = normalize(&correct.label);
    let push_unique = |candidate: &WordSnapshot, options: &mut Vec<ChoiceOption>| {
        let label = candidate.primary_answer(direction);
        let key = normalize(label);
        if key.is_empty()
            || key == correct_key
            || options.iter().any(|o| normalize(&o.label) == key)
        {
            return;
        }
        options.push(ChoiceOption {
            label: label.to_owned(),
            token: candidate.word.clone(),
        });
    };

    for candidate in pool {
        if options.len() >= max_distractors {
            break;
        }
        push_unique(candidate, &mut options);
    }

    if options.len() < max_distractors {
        let mut extra: Vec<&WordSnapshot> = fallback
            .iter()
            .filter(|s| s.word != word.word)
            .collect();
        extra.shuffle(&mut rng);
        for candidate in extra {
            if options.len() >= max_distractors {
                break;
            }
            push_unique(candidate, &mut options);
        }
    }

    options.push(correct);
    options.shuffle(&mut rng);
    options
}

/// Context for building a hint: the rest of the session and the turn seed.
#[derive(Debug, Clone, Copy)]
pub struct HintContext<'a> {
    pub siblings: &'a [WordSnapshot],
    pub fallback: &'a [WordSnapshot],
    pub max_distractors: usize,
    pub seed: u64,
}

/// Hint for `word` under `mode`.
#[must_use]
pub fn hint(
    word: &WordSnapshot,
    direction: Direction,
    mode: HintsMode,
    ctx: &HintContext<'_>,
) -> HintPayload {
    match mode {
        HintsMode::NoHints => HintPayload::None,
        HintsMode::Masked => HintPayload::Masked(mask(word.primary_answer(direction))),
        HintsMode::Test => HintPayload::Choices(choices(
            word,
            direction,
            ctx.siblings,
            ctx.fallback,
            ctx.max_distractors,
            ctx.seed,
        )),
        HintsMode::Flashcards => HintPayload::Reveal(word.answer(direction)),
    }
}
