//! Turn-by-turn quiz transitions.
//!
//! `advance` takes the decoded session and cursor by value and returns the
//! successor state with the replies for this turn. Nothing here touches storage.

use tracing::debug;

use vocab_core::grading;
use vocab_core::hints::{self, HintContext, HintPayload};
use vocab_core::model::{HintsMode, SessionId, Tally, TrainingSession};
use vocab_core::selector::turn_seed;

use super::aggregator::ScoreBatch;
use super::state::QuizCursor;
use crate::config::TrainingConfig;
use crate::error::QuizError;
use crate::reply::Reply;
use crate::texts;

/// Outcome of one quiz turn.
#[derive(Debug)]
pub enum QuizStep {
    /// Waiting for the answer to `cursor.step`.
    Next {
        session: TrainingSession,
        cursor: QuizCursor,
        replies: Vec<Reply>,
    },
    /// Every word answered. `batch` is present only when scores persist.
    Complete {
        session_id: SessionId,
        tally: Tally,
        batch: Option<ScoreBatch>,
        replies: Vec<Reply>,
    },
    /// Stopped by the user; nothing is aggregated.
    Aborted {
        session_id: SessionId,
        step: usize,
        replies: Vec<Reply>,
    },
}

impl QuizStep {
    #[must_use]
    pub fn replies(&self) -> &[Reply] {
        match self {
            QuizStep::Next { replies, .. }
            | QuizStep::Complete { replies, .. }
            | QuizStep::Aborted { replies, .. } => replies,
        }
    }
}

fn prompt(
    session: &TrainingSession,
    step: usize,
    config: &TrainingConfig,
) -> Result<(QuizCursor, Reply), QuizError> {
    let word = session
        .word(step)
        .ok_or_else(|| QuizError::CorruptState(format!("no word at step {step}")))?;
    let direction = session.direction();
    let ctx = HintContext {
        siblings: session.words(),
        fallback: session.distractors(),
        max_distractors: config.max_distractors,
        seed: turn_seed(session.id(), step),
    };
    let question = word.prompt(direction);

    let (reply, choices) = match hints::hint(word, direction, session.hints(), &ctx) {
        HintPayload::None => (Reply::text(question), Vec::new()),
        HintPayload::Masked(mask) => (Reply::text(format!("{question}\n{mask}")), Vec::new()),
        HintPayload::Choices(choices) => {
            let mut labels: Vec<String> = choices.iter().map(|c| c.label.clone()).collect();
            labels.push(config.stop_command.clone());
            (Reply::with_options(question, labels), choices)
        }
        HintPayload::Reveal(answer) => (
            Reply::with_options(
                format!("{question}\n\n{answer}"),
                vec![config.next_command.clone(), config.stop_command.clone()],
            ),
            Vec::new(),
        ),
    };

    Ok((
        QuizCursor {
            step,
            options: choices,
        },
        reply,
    ))
}

/// Prompt for the first word of a fresh session. Nothing is graded.
///
/// # Errors
///
/// Returns `QuizError::CorruptState` if the session cannot start at step 0.
pub fn first_prompt(
    session: &TrainingSession,
    config: &TrainingConfig,
) -> Result<(QuizCursor, Reply), QuizError> {
    session.check_step(0)?;
    prompt(session, 0, config)
}

/// Applies one user turn to a running quiz.
///
/// # Errors
///
/// Returns `QuizError::CorruptState` when the cursor does not fit the session.
pub fn advance(
    mut session: TrainingSession,
    cursor: QuizCursor,
    input: &str,
    config: &TrainingConfig,
) -> Result<QuizStep, QuizError> {
    let step = cursor.step;
    if config.is_stop(input) {
        return Ok(QuizStep::Aborted {
            session_id: session.id(),
            step,
            replies: vec![Reply::text(texts::TRAINING_STOPPED)],
        });
    }

    session.check_step(step)?;
    let direction = session.direction();
    let mode = session.hints();
    if mode == HintsMode::Test && cursor.options.is_empty() {
        return Err(QuizError::CorruptState(format!(
            "no options stored for step {step}"
        )));
    }

    let (grade, feedback) = {
        let word = session
            .word(step)
            .ok_or_else(|| QuizError::CorruptState(format!("no word at step {step}")))?;
        let grade = grading::grade(word, direction, mode, input, &cursor.options);
        let feedback = if grade.is_correct() {
            Reply::text(texts::CORRECT_ANSWER)
        } else {
            Reply::text(texts::wrong_answer(&word.answer(direction)))
        };
        debug!(
            session = %session.id(),
            step,
            word = %word.word,
            correct = grade.is_correct(),
            "answer graded"
        );
        (grade, feedback)
    };
    session.record_grade(step, grade)?;

    let next = step + 1;
    if next < session.len() {
        let (cursor, question) = prompt(&session, next, config)?;
        return Ok(QuizStep::Next {
            session,
            cursor,
            replies: vec![feedback, question],
        });
    }

    let tally = Tally::from_grades(session.grades(), session.len());
    let batch = if mode.persists_scores() {
        ScoreBatch::from_session(&session)
    } else {
        None
    };
    let mut replies = vec![feedback];
    if batch.is_none() {
        replies.push(Reply::text(texts::NO_SCORES));
    }
    replies.push(Reply::text(texts::results(tally)));

    Ok(QuizStep::Complete {
        session_id: session.id(),
        tally,
        batch,
        replies,
    })
}
