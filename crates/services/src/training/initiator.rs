use std::collections::HashSet;

use tracing::info;

use storage::repository::{GroupRecord, VocabularyRepository};
use vocab_core::Clock;
use vocab_core::model::{
    Direction, GroupRef, HintsMode, OwnerId, SessionDuration, SessionId, SessionRecordError,
    Strategy, TrainingParams, TrainingSession, WordStats,
};
use vocab_core::selector::{self, SelectionRequest};

use super::runner::first_prompt;
use super::state::{QuizState, Selection, Stage};
use crate::config::TrainingConfig;
use crate::error::SessionError;
use crate::reply::Reply;
use crate::texts;

/// Result of one parameter-gathering turn.
#[derive(Debug)]
pub enum Gathered {
    /// Still choosing; persist `stage` and wait for the next message.
    Continue { stage: Stage, replies: Vec<Reply> },
    /// Gathering ended without a session.
    Finished { replies: Vec<Reply> },
    /// All parameters collected and a quiz begins.
    Started { quiz: QuizState, replies: Vec<Reply> },
}

/// Outcome of [`SessionInitiator::begin_session`].
#[derive(Debug)]
pub enum BeginOutcome {
    Session {
        session: TrainingSession,
        /// An explicit word count asked for more words than matched.
        fewer_than_requested: bool,
    },
    Empty,
}

/// Collects training parameters and materializes sessions.
pub struct SessionInitiator<'a> {
    vocabulary: &'a dyn VocabularyRepository,
    clock: Clock,
    config: &'a TrainingConfig,
}

impl<'a> SessionInitiator<'a> {
    #[must_use]
    pub fn new(
        vocabulary: &'a dyn VocabularyRepository,
        clock: Clock,
        config: &'a TrainingConfig,
    ) -> Self {
        Self {
            vocabulary,
            clock,
            config,
        }
    }

    fn with_cancel(&self, mut options: Vec<String>) -> Vec<String> {
        options.push(self.config.cancel_command.clone());
        options
    }

    fn strategy_prompt(&self, text: &str) -> Reply {
        let options = Strategy::ALL.iter().map(|s| s.as_str().to_owned()).collect();
        Reply::with_options(text, self.with_cancel(options))
    }

    fn direction_prompt(&self, text: &str) -> Reply {
        let options = Direction::ALL.iter().map(|d| d.label().to_owned()).collect();
        Reply::with_options(text, self.with_cancel(options))
    }

    fn duration_prompt(&self, text: &str) -> Reply {
        let options = SessionDuration::PRESETS
            .iter()
            .map(|p| (*p).to_owned())
            .collect();
        Reply::with_options(text, self.with_cancel(options))
    }

    fn hints_prompt(&self, text: &str) -> Reply {
        let options = HintsMode::ALL.iter().map(|h| h.as_str().to_owned()).collect();
        Reply::with_options(text, self.with_cancel(options))
    }

    fn group_prompt(&self, text: &str, groups: &[GroupRecord]) -> Reply {
        let options = groups.iter().map(|g| g.name.clone()).collect();
        Reply::with_options(text, self.with_cancel(options))
    }

    /// First gathering step for `language`.
    #[must_use]
    pub fn start(&self, language: &str) -> (Stage, Reply) {
        (
            Stage::Strategy {
                language: language.to_owned(),
            },
            self.strategy_prompt(texts::TRAINING_INIT),
        )
    }

    /// Applies one answer to the current gathering stage.
    ///
    /// Invalid input re-prompts and keeps the stage unchanged. The cancel and
    /// stop commands both end the setup.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the vocabulary store fails.
    pub async fn handle(
        &self,
        owner: OwnerId,
        stage: Stage,
        input: &str,
    ) -> Result<Gathered, SessionError> {
        if self.config.is_cancel(input) || self.config.is_stop(input) {
            return Ok(Gathered::Finished {
                replies: vec![Reply::text(texts::TRAINING_CANCELLED)],
            });
        }

        let gathered = match stage {
            Stage::Strategy { language } => match Strategy::parse(input) {
                Ok(Strategy::Group) => {
                    let groups = self.vocabulary.list_groups(owner, &language).await?;
                    if groups.is_empty() {
                        return Ok(Gathered::Finished {
                            replies: vec![Reply::text(texts::NO_GROUPS_YET)],
                        });
                    }
                    Gathered::Continue {
                        replies: vec![self.group_prompt(texts::TRAINING_GROUP, &groups)],
                        stage: Stage::Group { language },
                    }
                }
                Ok(strategy) => Gathered::Continue {
                    stage: Stage::Direction {
                        selection: Selection {
                            language,
                            strategy,
                            group: None,
                        },
                    },
                    replies: vec![self.direction_prompt(texts::TRAINING_DIRECTION)],
                },
                Err(_) => Gathered::Continue {
                    stage: Stage::Strategy { language },
                    replies: vec![self.strategy_prompt(texts::STRATEGY_UNKNOWN)],
                },
            },
            Stage::Group { language } => {
                let name = input.trim();
                match self
                    .vocabulary
                    .find_group_by_name(owner, &language, name)
                    .await?
                {
                    Some(group) => Gathered::Continue {
                        stage: Stage::Direction {
                            selection: Selection {
                                language,
                                strategy: Strategy::Group,
                                group: Some(GroupRef {
                                    id: group.id,
                                    name: group.name,
                                }),
                            },
                        },
                        replies: vec![self.direction_prompt(texts::TRAINING_DIRECTION)],
                    },
                    None => {
                        let groups = self.vocabulary.list_groups(owner, &language).await?;
                        Gathered::Continue {
                            replies: vec![self.group_prompt(texts::NO_SUCH_GROUP, &groups)],
                            stage: Stage::Group { language },
                        }
                    }
                }
            }
            Stage::Direction { selection } => match Direction::parse(input) {
                Ok(direction) => Gathered::Continue {
                    stage: Stage::Duration {
                        selection,
                        direction,
                    },
                    replies: vec![self.duration_prompt(texts::TRAINING_DURATION)],
                },
                Err(_) => Gathered::Continue {
                    stage: Stage::Direction { selection },
                    replies: vec![self.direction_prompt(texts::DIRECTION_UNKNOWN)],
                },
            },
            Stage::Duration {
                selection,
                direction,
            } => match SessionDuration::parse(input) {
                Ok(duration) => Gathered::Continue {
                    stage: Stage::Hints {
                        selection,
                        direction,
                        duration,
                    },
                    replies: vec![self.hints_prompt(texts::TRAINING_HINTS)],
                },
                Err(_) => Gathered::Continue {
                    stage: Stage::Duration {
                        selection,
                        direction,
                    },
                    replies: vec![self.duration_prompt(texts::DURATION_UNKNOWN)],
                },
            },
            Stage::Hints {
                selection,
                direction,
                duration,
            } => match HintsMode::parse(input) {
                Ok(hints) => {
                    let params = selection.into_params(direction, duration, hints);
                    self.start_quiz(owner, params).await?
                }
                Err(_) => Gathered::Continue {
                    stage: Stage::Hints {
                        selection,
                        direction,
                        duration,
                    },
                    replies: vec![self.hints_prompt(texts::HINTS_UNKNOWN)],
                },
            },
        };
        Ok(gathered)
    }

    async fn start_quiz(
        &self,
        owner: OwnerId,
        params: TrainingParams,
    ) -> Result<Gathered, SessionError> {
        match self.begin_session(owner, params).await? {
            BeginOutcome::Empty => Ok(Gathered::Finished {
                replies: vec![Reply::text(texts::NO_WORDS_FOUND)],
            }),
            BeginOutcome::Session {
                session,
                fewer_than_requested,
            } => {
                let (cursor, question) = first_prompt(&session, self.config)?;
                let mut replies = vec![Reply::text(texts::training_start(&session))];
                if fewer_than_requested {
                    replies.push(Reply::text(texts::FEWER_WORDS));
                }
                replies.push(question);
                Ok(Gathered::Started {
                    quiz: QuizState { session, cursor },
                    replies,
                })
            }
        }
    }

    /// Selects the words for `params` and builds the session record.
    ///
    /// The session id is the creation time in whole seconds.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the store fails or a group session has no group.
    pub async fn begin_session(
        &self,
        owner: OwnerId,
        params: TrainingParams,
    ) -> Result<BeginOutcome, SessionError> {
        let created_at = self.clock.now_seconds();
        let session_id = SessionId::from_created_at(created_at);

        let candidates = self
            .vocabulary
            .fetch_candidates(owner, &params.language)
            .await?;
        let members = match (params.strategy, &params.group) {
            (Strategy::Group, Some(group)) => {
                Some(self.vocabulary.fetch_group_members(owner, &group.id).await?)
            }
            (Strategy::Group, None) => return Err(SessionRecordError::MissingGroup.into()),
            _ => None,
        };

        let duration = params.duration.resolve(self.config.max_words);
        let request = SelectionRequest {
            session_id,
            strategy: params.strategy,
            direction: params.direction,
            duration,
            group_members: members.as_ref(),
        };
        let words = selector::select(&request, &candidates);
        if words.is_empty() {
            info!(
                owner = %owner,
                strategy = %params.strategy,
                language = %params.language,
                "no words matched training parameters"
            );
            return Ok(BeginOutcome::Empty);
        }

        let fewer_than_requested = params.duration.is_explicit()
            && u32::try_from(words.len()).is_ok_and(|found| found < duration);

        let distractors =
            if params.hints == HintsMode::Test && words.len() <= self.config.max_distractors {
                let in_session: HashSet<&str> = words.iter().map(|w| w.word.as_str()).collect();
                selector::rank_order(
                    session_id,
                    candidates
                        .iter()
                        .filter(|w| !in_session.contains(w.word.as_str())),
                )
                .into_iter()
                .take(self.config.max_distractors)
                .map(WordStats::snapshot)
                .collect()
            } else {
                Vec::new()
            };

        let session = TrainingSession::new(session_id, owner, created_at, params, words)?
            .with_distractors(distractors);
        info!(
            owner = %owner,
            session = %session.id(),
            strategy = %session.params().strategy,
            direction = %session.direction(),
            hints = %session.hints(),
            words = session.len(),
            "training session created"
        );
        Ok(BeginOutcome::Session {
            session,
            fewer_than_requested,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;
    use vocab_core::model::GroupId;
    use vocab_core::time::{fixed_clock, fixed_now};

    fn owner() -> OwnerId {
        OwnerId::new(1)
    }

    fn repo(words: &[(&str, &str)]) -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        for (w, t) in words {
            let word = WordStats::new(*w, vec![(*t).to_owned()], fixed_now()).unwrap();
            repo.insert_word(owner(), "es", word).unwrap();
        }
        repo
    }

    fn params(strategy: Strategy, duration: SessionDuration, hints: HintsMode) -> TrainingParams {
        TrainingParams {
            language: "es".into(),
            strategy,
            group: None,
            direction: Direction::From,
            duration,
            hints,
        }
    }

    #[tokio::test]
    async fn begin_caps_at_pool_and_flags_fewer_words() {
        let repo = repo(&[
            ("one", "uno"),
            ("two", "dos"),
            ("three", "tres"),
            ("four", "cuatro"),
            ("five", "cinco"),
        ]);
        let cfg = TrainingConfig::default();
        let init = SessionInitiator::new(&repo, fixed_clock(), &cfg);

        let outcome = init
            .begin_session(
                owner(),
                params(Strategy::Random, SessionDuration::Words(10), HintsMode::NoHints),
            )
            .await
            .unwrap();
        match outcome {
            BeginOutcome::Session {
                session,
                fewer_than_requested,
            } => {
                assert_eq!(session.len(), 5);
                assert!(fewer_than_requested);
                assert_eq!(session.id().value(), 1_700_000_000);
                assert_eq!(session.created_at(), fixed_now());
            }
            BeginOutcome::Empty => panic!("expected a session"),
        }

        let outcome = init
            .begin_session(
                owner(),
                params(Strategy::Random, SessionDuration::All, HintsMode::NoHints),
            )
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            BeginOutcome::Session {
                fewer_than_requested: false,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn begin_with_no_candidates_is_empty() {
        let repo = repo(&[]);
        let cfg = TrainingConfig::default();
        let init = SessionInitiator::new(&repo, fixed_clock(), &cfg);
        let outcome = init
            .begin_session(
                owner(),
                params(Strategy::Bad, SessionDuration::Words(10), HintsMode::NoHints),
            )
            .await
            .unwrap();
        assert!(matches!(outcome, BeginOutcome::Empty));
    }

    #[tokio::test]
    async fn small_test_session_gets_outside_distractors() {
        let repo = repo(&[
            ("one", "uno"),
            ("two", "dos"),
            ("three", "tres"),
            ("four", "cuatro"),
        ]);
        repo.insert_group(
            owner(),
            "es",
            GroupRecord {
                id: GroupId::new("g"),
                name: "pair".into(),
            },
            ["one".to_owned(), "two".to_owned()],
        )
        .unwrap();
        let cfg = TrainingConfig::default();
        let init = SessionInitiator::new(&repo, fixed_clock(), &cfg);

        let mut p = params(Strategy::Group, SessionDuration::All, HintsMode::Test);
        p.group = Some(GroupRef {
            id: GroupId::new("g"),
            name: "pair".into(),
        });
        let BeginOutcome::Session { session, .. } = init.begin_session(owner(), p).await.unwrap()
        else {
            panic!("expected a session");
        };
        assert_eq!(session.len(), 2);
        let extra: Vec<&str> = session
            .distractors()
            .iter()
            .map(|w| w.word.as_str())
            .collect();
        assert_eq!(extra.len(), 2);
        assert!(extra.iter().all(|w| *w == "three" || *w == "four"));
    }

    #[tokio::test]
    async fn invalid_choice_reprompts_with_same_stage() {
        let repo = repo(&[("one", "uno")]);
        let cfg = TrainingConfig::default();
        let init = SessionInitiator::new(&repo, fixed_clock(), &cfg);
        let (stage, first) = init.start("es");
        assert!(first.options.contains(&"random".to_string()));

        let Gathered::Continue {
            stage: same,
            replies,
        } = init.handle(owner(), stage.clone(), "sideways").await.unwrap()
        else {
            panic!("expected re-prompt");
        };
        assert_eq!(same, stage);
        assert_eq!(replies[0].text, texts::STRATEGY_UNKNOWN);
        assert_eq!(replies[0].options, first.options);
    }

    #[tokio::test]
    async fn group_strategy_without_groups_finishes() {
        let repo = repo(&[("one", "uno")]);
        let cfg = TrainingConfig::default();
        let init = SessionInitiator::new(&repo, fixed_clock(), &cfg);
        let (stage, _) = init.start("es");
        let gathered = init.handle(owner(), stage, "group").await.unwrap();
        let Gathered::Finished { replies } = gathered else {
            panic!("expected finish");
        };
        assert_eq!(replies[0].text, texts::NO_GROUPS_YET);
    }

    #[tokio::test]
    async fn cancel_ends_any_stage() {
        let repo = repo(&[("one", "uno")]);
        let cfg = TrainingConfig::default();
        let init = SessionInitiator::new(&repo, fixed_clock(), &cfg);
        let stage = Stage::Duration {
            selection: Selection {
                language: "es".into(),
                strategy: Strategy::New,
                group: None,
            },
            direction: Direction::To,
        };
        let Gathered::Finished { replies } = init.handle(owner(), stage, "/cancel").await.unwrap()
        else {
            panic!("expected finish");
        };
        assert_eq!(replies[0].text, texts::TRAINING_CANCELLED);
    }

    #[tokio::test]
    async fn stop_ends_setup_like_cancel() {
        let repo = repo(&[("one", "uno")]);
        let cfg = TrainingConfig::default();
        let init = SessionInitiator::new(&repo, fixed_clock(), &cfg);
        let (stage, _) = init.start("es");
        let Gathered::Finished { replies } = init.handle(owner(), stage, " /stop ").await.unwrap()
        else {
            panic!("expected finish");
        };
        assert_eq!(replies[0].text, texts::TRAINING_CANCELLED);
    }
}
