use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs the versioned migrations for the vocabulary schema.
///
/// Version 1 creates words, groups with their members, and per-owner conversation state.
pub async fn run_migrations(
    pool: &SqlitePool,
    now: DateTime<Utc>,
) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS words (
                    owner_id INTEGER NOT NULL,
                    language TEXT NOT NULL,
                    word TEXT NOT NULL,
                    translations TEXT NOT NULL,
                    to_score_sum INTEGER NOT NULL DEFAULT 0 CHECK (to_score_sum >= 0),
                    to_trained_count INTEGER NOT NULL DEFAULT 0 CHECK (to_trained_count >= 0),
                    to_last_trained TEXT,
                    from_score_sum INTEGER NOT NULL DEFAULT 0 CHECK (from_score_sum >= 0),
                    from_trained_count INTEGER NOT NULL DEFAULT 0 CHECK (from_trained_count >= 0),
                    from_last_trained TEXT,
                    created_at TEXT NOT NULL,
                    PRIMARY KEY (owner_id, language, word),
                    CHECK (to_score_sum <= to_trained_count),
                    CHECK (from_score_sum <= from_trained_count)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS word_groups (
                    id TEXT PRIMARY KEY,
                    owner_id INTEGER NOT NULL,
                    language TEXT NOT NULL,
                    name TEXT NOT NULL,
                    UNIQUE (owner_id, language, name)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS group_members (
                    group_id TEXT NOT NULL,
                    word TEXT NOT NULL,
                    PRIMARY KEY (group_id, word),
                    FOREIGN KEY (group_id) REFERENCES word_groups(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS conversation_state (
                    owner_id INTEGER PRIMARY KEY,
                    blob TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_words_owner_language
                ON words(owner_id, language);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
