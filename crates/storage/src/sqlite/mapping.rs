use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use vocab_core::model::{DirectionStats, GroupId, WordStats};

use crate::repository::{GroupRecord, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn i64_to_u32(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn translations_to_json(translations: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(translations).map_err(ser)
}

fn direction_stats(row: &SqliteRow, prefix: &str) -> Result<DirectionStats, StorageError> {
    let score_sum: i64 = row.try_get(format!("{prefix}_score_sum").as_str()).map_err(ser)?;
    let trained_count: i64 = row
        .try_get(format!("{prefix}_trained_count").as_str())
        .map_err(ser)?;
    let last_trained: Option<DateTime<Utc>> = row
        .try_get(format!("{prefix}_last_trained").as_str())
        .map_err(ser)?;
    DirectionStats::new(
        i64_to_u32("score_sum", score_sum)?,
        i64_to_u32("trained_count", trained_count)?,
        last_trained,
    )
    .map_err(ser)
}

pub(crate) fn map_word_row(row: &SqliteRow) -> Result<WordStats, StorageError> {
    let translations_raw: String = row.try_get("translations").map_err(ser)?;
    let translations: Vec<String> = serde_json::from_str(&translations_raw).map_err(ser)?;
    if translations.is_empty() {
        return Err(StorageError::Serialization("word without translations".into()));
    }

    Ok(WordStats {
        word: row.try_get("word").map_err(ser)?,
        translations,
        to: direction_stats(row, "to")?,
        from: direction_stats(row, "from")?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}

pub(crate) fn map_group_row(row: &SqliteRow) -> Result<GroupRecord, StorageError> {
    let id: String = row.try_get("id").map_err(ser)?;
    Ok(GroupRecord {
        id: GroupId::new(id),
        name: row.try_get("name").map_err(ser)?,
    })
}
