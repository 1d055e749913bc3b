#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod reply;
pub mod texts;
pub mod training;

pub use vocab_core::Clock;

pub use config::TrainingConfig;
pub use error::{QuizError, SessionError};
pub use reply::Reply;
pub use training::{
    BeginOutcome, ConversationState, QuizCursor, QuizState, QuizStep, ScoreBatch,
    SessionInitiator, TrainingService,
};
