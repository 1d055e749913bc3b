use sqlx::Row;
use vocab_core::model::OwnerId;

use super::SqliteRepository;
use super::mapping::{conn, ser};
use crate::repository::{ConversationStateStore, StorageError};

#[async_trait::async_trait]
impl ConversationStateStore for SqliteRepository {
    async fn get(&self, owner: OwnerId) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT blob FROM conversation_state WHERE owner_id = ?1")
            .bind(owner.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;
        row.map(|r| r.try_get::<String, _>("blob").map_err(ser))
            .transpose()
    }

    async fn set(&self, owner: OwnerId, blob: &str) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO conversation_state (owner_id, blob, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(owner_id) DO UPDATE SET
                blob = excluded.blob,
                updated_at = excluded.updated_at
            ",
        )
        .bind(owner.value())
        .bind(blob)
        .bind(self.clock.now())
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn clear(&self, owner: OwnerId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM conversation_state WHERE owner_id = ?1")
            .bind(owner.value())
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }
}
