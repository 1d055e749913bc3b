use std::collections::HashSet;

use sqlx::Row;
use vocab_core::model::{Direction, GroupId, OwnerId, WordStats};

use super::SqliteRepository;
use super::mapping::{conn, map_group_row, map_word_row, ser, translations_to_json};
use crate::repository::{GroupRecord, ScoreUpdate, StorageError, VocabularyRepository};

const UPDATE_TO: &str = r"
    UPDATE words SET
        to_trained_count = to_trained_count + ?1,
        to_score_sum = MIN(to_score_sum + ?2, to_trained_count + ?1),
        to_last_trained = ?3
    WHERE owner_id = ?4 AND language = ?5 AND word = ?6
";

const UPDATE_FROM: &str = r"
    UPDATE words SET
        from_trained_count = from_trained_count + ?1,
        from_score_sum = MIN(from_score_sum + ?2, from_trained_count + ?1),
        from_last_trained = ?3
    WHERE owner_id = ?4 AND language = ?5 AND word = ?6
";

impl SqliteRepository {
    /// Inserts a word or replaces its translations and statistics.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn upsert_word(
        &self,
        owner: OwnerId,
        language: &str,
        word: &WordStats,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO words (
                owner_id, language, word, translations,
                to_score_sum, to_trained_count, to_last_trained,
                from_score_sum, from_trained_count, from_last_trained,
                created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(owner_id, language, word) DO UPDATE SET
                translations = excluded.translations,
                to_score_sum = excluded.to_score_sum,
                to_trained_count = excluded.to_trained_count,
                to_last_trained = excluded.to_last_trained,
                from_score_sum = excluded.from_score_sum,
                from_trained_count = excluded.from_trained_count,
                from_last_trained = excluded.from_last_trained
            ",
        )
        .bind(owner.value())
        .bind(language)
        .bind(word.word.as_str())
        .bind(translations_to_json(&word.translations)?)
        .bind(i64::from(word.to.score_sum()))
        .bind(i64::from(word.to.trained_count()))
        .bind(word.to.last_trained())
        .bind(i64::from(word.from.score_sum()))
        .bind(i64::from(word.from.trained_count()))
        .bind(word.from.last_trained())
        .bind(word.created_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    /// Creates a group and its membership rows in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id or name is taken.
    pub async fn insert_group(
        &self,
        owner: OwnerId,
        language: &str,
        group: &GroupRecord,
        members: &[String],
    ) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query(
            r"
            INSERT INTO word_groups (id, owner_id, language, name)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(group.id.as_str())
        .bind(owner.value())
        .bind(language)
        .bind(group.name.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
            other => conn(other),
        })?;

        for word in members {
            sqlx::query(
                r"
                INSERT INTO group_members (group_id, word)
                VALUES (?1, ?2)
                ON CONFLICT(group_id, word) DO NOTHING
                ",
            )
            .bind(group.id.as_str())
            .bind(word.as_str())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl VocabularyRepository for SqliteRepository {
    async fn fetch_candidates(
        &self,
        owner: OwnerId,
        language: &str,
    ) -> Result<Vec<WordStats>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT word, translations,
                   to_score_sum, to_trained_count, to_last_trained,
                   from_score_sum, from_trained_count, from_last_trained,
                   created_at
            FROM words
            WHERE owner_id = ?1 AND language = ?2
            ORDER BY word ASC
            ",
        )
        .bind(owner.value())
        .bind(language)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_word_row).collect()
    }

    async fn fetch_group_members(
        &self,
        owner: OwnerId,
        group_id: &GroupId,
    ) -> Result<HashSet<String>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT m.word
            FROM group_members m
            JOIN word_groups g ON g.id = m.group_id
            WHERE g.owner_id = ?1 AND g.id = ?2
            ",
        )
        .bind(owner.value())
        .bind(group_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("word").map_err(ser))
            .collect()
    }

    async fn find_group_by_name(
        &self,
        owner: OwnerId,
        language: &str,
        name: &str,
    ) -> Result<Option<GroupRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, name FROM word_groups
            WHERE owner_id = ?1 AND language = ?2 AND name = ?3
            ",
        )
        .bind(owner.value())
        .bind(language)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_group_row).transpose()
    }

    async fn list_groups(
        &self,
        owner: OwnerId,
        language: &str,
    ) -> Result<Vec<GroupRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, name FROM word_groups
            WHERE owner_id = ?1 AND language = ?2
            ORDER BY name ASC
            ",
        )
        .bind(owner.value())
        .bind(language)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_group_row).collect()
    }

    async fn apply_score_updates(
        &self,
        owner: OwnerId,
        language: &str,
        direction: Direction,
        updates: &[ScoreUpdate],
    ) -> Result<(), StorageError> {
        if updates.is_empty() {
            return Ok(());
        }
        let statement = match direction {
            Direction::To => UPDATE_TO,
            Direction::From => UPDATE_FROM,
        };

        let mut tx = self.pool.begin().await.map_err(conn)?;
        for update in updates {
            sqlx::query(statement)
                .bind(i64::from(update.delta_count))
                .bind(i64::from(update.delta_score))
                .bind(update.timestamp)
                .bind(owner.value())
                .bind(language)
                .bind(update.word.as_str())
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
        }
        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
