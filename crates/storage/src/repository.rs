use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use vocab_core::model::{Direction, GroupId, OwnerId, WordStats};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A named group of words inside one owner's language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecord {
    pub id: GroupId,
    pub name: String,
}

/// One row of a bulk statistics update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreUpdate {
    pub word: String,
    pub delta_score: u32,
    pub delta_count: u32,
    pub timestamp: DateTime<Utc>,
}

/// Read access to an owner's vocabulary plus the single statistics write path.
#[async_trait]
pub trait VocabularyRepository: Send + Sync {
    /// All words of `language` with their per-direction statistics.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn fetch_candidates(
        &self,
        owner: OwnerId,
        language: &str,
    ) -> Result<Vec<WordStats>, StorageError>;

    /// Word keys belonging to a group. Unknown groups are empty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn fetch_group_members(
        &self,
        owner: OwnerId,
        group_id: &GroupId,
    ) -> Result<HashSet<String>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn find_group_by_name(
        &self,
        owner: OwnerId,
        language: &str,
        name: &str,
    ) -> Result<Option<GroupRecord>, StorageError>;

    /// Groups of `language`, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn list_groups(
        &self,
        owner: OwnerId,
        language: &str,
    ) -> Result<Vec<GroupRecord>, StorageError>;

    /// Applies every update atomically for one direction.
    ///
    /// Updates for words that no longer exist are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the batch cannot be written; nothing is applied then.
    async fn apply_score_updates(
        &self,
        owner: OwnerId,
        language: &str,
        direction: Direction,
        updates: &[ScoreUpdate],
    ) -> Result<(), StorageError>;
}

/// Opaque per-owner conversation state kept between turns.
#[async_trait]
pub trait ConversationStateStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn get(&self, owner: OwnerId) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the blob cannot be stored.
    async fn set(&self, owner: OwnerId, blob: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the blob cannot be removed.
    async fn clear(&self, owner: OwnerId) -> Result<(), StorageError>;
}

type LanguageKey = (OwnerId, String);

#[derive(Default)]
struct MemoryData {
    words: HashMap<LanguageKey, BTreeMap<String, WordStats>>,
    groups: HashMap<LanguageKey, Vec<GroupRecord>>,
    members: HashMap<(OwnerId, GroupId), HashSet<String>>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    data: Arc<Mutex<MemoryData>>,
    states: Arc<Mutex<HashMap<OwnerId, String>>>,
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a word, keyed by its text.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn insert_word(
        &self,
        owner: OwnerId,
        language: &str,
        word: WordStats,
    ) -> Result<(), StorageError> {
        let mut guard = self.data.lock().map_err(poisoned)?;
        guard
            .words
            .entry((owner, language.to_owned()))
            .or_default()
            .insert(word.word.clone(), word);
        Ok(())
    }

    /// Creates a group with the given members.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if a group with that name exists.
    pub fn insert_group(
        &self,
        owner: OwnerId,
        language: &str,
        group: GroupRecord,
        members: impl IntoIterator<Item = String>,
    ) -> Result<(), StorageError> {
        let mut guard = self.data.lock().map_err(poisoned)?;
        let groups = guard
            .groups
            .entry((owner, language.to_owned()))
            .or_default();
        if groups.iter().any(|g| g.name == group.name) {
            return Err(StorageError::Conflict);
        }
        groups.push(group.clone());
        guard
            .members
            .insert((owner, group.id), members.into_iter().collect());
        Ok(())
    }

    /// Looks up one word, mostly for assertions.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the word does not exist.
    pub fn word(
        &self,
        owner: OwnerId,
        language: &str,
        word: &str,
    ) -> Result<WordStats, StorageError> {
        let guard = self.data.lock().map_err(poisoned)?;
        guard
            .words
            .get(&(owner, language.to_owned()))
            .and_then(|words| words.get(word))
            .cloned()
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl VocabularyRepository for InMemoryRepository {
    async fn fetch_candidates(
        &self,
        owner: OwnerId,
        language: &str,
    ) -> Result<Vec<WordStats>, StorageError> {
        let guard = self.data.lock().map_err(poisoned)?;
        Ok(guard
            .words
            .get(&(owner, language.to_owned()))
            .map(|words| words.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn fetch_group_members(
        &self,
        owner: OwnerId,
        group_id: &GroupId,
    ) -> Result<HashSet<String>, StorageError> {
        let guard = self.data.lock().map_err(poisoned)?;
        Ok(guard
            .members
            .get(&(owner, group_id.clone()))
            .cloned()
            .unwrap_or_default())
    }

    async fn find_group_by_name(
        &self,
        owner: OwnerId,
        language: &str,
        name: &str,
    ) -> Result<Option<GroupRecord>, StorageError> {
        let guard = self.data.lock().map_err(poisoned)?;
        Ok(guard
            .groups
            .get(&(owner, language.to_owned()))
            .and_then(|groups| groups.iter().find(|g| g.name == name))
            .cloned())
    }

    async fn list_groups(
        &self,
        owner: OwnerId,
        language: &str,
    ) -> Result<Vec<GroupRecord>, StorageError> {
        let guard = self.data.lock().map_err(poisoned)?;
        let mut groups = guard
            .groups
            .get(&(owner, language.to_owned()))
            .cloned()
            .unwrap_or_default();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn apply_score_updates(
        &self,
        owner: OwnerId,
        language: &str,
        direction: Direction,
        updates: &[ScoreUpdate],
    ) -> Result<(), StorageError> {
        let mut guard = self.data.lock().map_err(poisoned)?;
        let Some(words) = guard.words.get_mut(&(owner, language.to_owned())) else {
            return Ok(());
        };
        for update in updates {
            if let Some(word) = words.get_mut(&update.word) {
                word.stats_mut(direction).apply(
                    update.delta_score,
                    update.delta_count,
                    update.timestamp,
                );
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ConversationStateStore for InMemoryRepository {
    async fn get(&self, owner: OwnerId) -> Result<Option<String>, StorageError> {
        let guard = self.states.lock().map_err(poisoned)?;
        Ok(guard.get(&owner).cloned())
    }

    async fn set(&self, owner: OwnerId, blob: &str) -> Result<(), StorageError> {
        let mut guard = self.states.lock().map_err(poisoned)?;
        guard.insert(owner, blob.to_owned());
        Ok(())
    }

    async fn clear(&self, owner: OwnerId) -> Result<(), StorageError> {
        let mut guard = self.states.lock().map_err(poisoned)?;
        guard.remove(&owner);
        Ok(())
    }
}

/// Vocabulary and conversation-state handles behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub vocabulary: Arc<dyn VocabularyRepository>,
    pub states: Arc<dyn ConversationStateStore>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocab_core::time::fixed_now;

    fn owner() -> OwnerId {
        OwnerId::new(1)
    }

    fn seeded() -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        for (w, t) in [("cat", "gato"), ("dog", "perro"), ("house", "casa")] {
            let word = WordStats::new(w, vec![t.to_owned()], fixed_now()).unwrap();
            repo.insert_word(owner(), "es", word).unwrap();
        }
        repo
    }

    #[tokio::test]
    async fn candidates_are_partitioned_by_owner_and_language() {
        let repo = seeded();
        assert_eq!(repo.fetch_candidates(owner(), "es").await.unwrap().len(), 3);
        assert!(repo.fetch_candidates(owner(), "de").await.unwrap().is_empty());
        assert!(
            repo.fetch_candidates(OwnerId::new(2), "es")
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn score_updates_touch_only_listed_words_and_direction() {
        let repo = seeded();
        let later = fixed_now() + chrono::Duration::hours(1);
        let updates = vec![
            ScoreUpdate {
                word: "cat".into(),
                delta_score: 1,
                delta_count: 1,
                timestamp: later,
            },
            ScoreUpdate {
                word: "ghost".into(),
                delta_score: 1,
                delta_count: 1,
                timestamp: later,
            },
        ];
        repo.apply_score_updates(owner(), "es", Direction::From, &updates)
            .await
            .unwrap();

        let cat = repo.word(owner(), "es", "cat").unwrap();
        assert_eq!(cat.from.trained_count(), 1);
        assert_eq!(cat.from.score_sum(), 1);
        assert_eq!(cat.from.last_trained(), Some(later));
        assert_eq!(cat.to.trained_count(), 0);

        let dog = repo.word(owner(), "es", "dog").unwrap();
        assert_eq!(dog.from.trained_count(), 0);
    }

    #[tokio::test]
    async fn groups_resolve_by_name() {
        let repo = seeded();
        let group = GroupRecord {
            id: GroupId::new("g1"),
            name: "pets".into(),
        };
        repo.insert_group(owner(), "es", group.clone(), ["cat".into(), "dog".into()])
            .unwrap();
        assert!(matches!(
            repo.insert_group(owner(), "es", group.clone(), Vec::new()),
            Err(StorageError::Conflict)
        ));

        let found = repo
            .find_group_by_name(owner(), "es", "pets")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, group);
        let members = repo.fetch_group_members(owner(), &found.id).await.unwrap();
        assert_eq!(members.len(), 2);
        assert!(
            repo.find_group_by_name(owner(), "es", "food")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn state_store_round_trips_and_clears() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.get(owner()).await.unwrap(), None);
        repo.set(owner(), "{\"a\":1}").await.unwrap();
        assert_eq!(repo.get(owner()).await.unwrap().as_deref(), Some("{\"a\":1}"));
        repo.clear(owner()).await.unwrap();
        assert_eq!(repo.get(owner()).await.unwrap(), None);
    }
}
