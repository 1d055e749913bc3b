#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    ConversationStateStore, GroupRecord, InMemoryRepository, ScoreUpdate, Storage, StorageError,
    VocabularyRepository,
};
