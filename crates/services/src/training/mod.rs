mod aggregator;
mod initiator;
mod runner;
mod service;
mod state;

// Public API of the training subsystem.
pub use aggregator::{ScoreBatch, aggregate};
pub use initiator::{BeginOutcome, Gathered, SessionInitiator};
pub use runner::{QuizStep, advance, first_prompt};
pub use service::TrainingService;
pub use state::{ConversationState, QuizCursor, QuizState, Selection, Stage};
