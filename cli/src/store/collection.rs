//! Conversation collection backed by SQLite.
//!
//! Stands in for a document store: one row per `Conversation`, queried by user and
//! ordered by `created_at`. Duplicate suppression is global on `user_message`.

use crate::bot::mood::Mood;
use crate::common::fs::io;
use crate::core::error::{Result, SnorelaxError};
use crate::store::records::Conversation;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row as _, SqlitePool};
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;
use tracing::{debug, warn};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS conversations (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    user_message TEXT NOT NULL,
    bot_reply TEXT NOT NULL,
    mood TEXT NOT NULL,
    language TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_conversations_user ON conversations (user_id, created_at);
CREATE INDEX IF NOT EXISTS idx_conversations_message ON conversations (user_message);
";

#[derive(Debug, Clone)]
pub struct ChatCollection {
    pool: SqlitePool,
}

impl ChatCollection {
    /// Opens (or creates) the database file and applies the schema.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            io::ensure_dir_exists(parent)?;
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(SnorelaxError::from)?;
        debug!("Opened conversation collection at {}", path.display());
        Self::with_pool(pool).await
    }

    /// Private in-memory database. One connection, so every query sees the same data.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(SnorelaxError::from)?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .map_err(SnorelaxError::from)?;
        Ok(Self { pool })
    }

    /// Inserts unless some document already has the same `user_message`.
    ///
    /// Returns whether the row was written.
    pub async fn insert_if_new(&self, conversation: &Conversation) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO conversations (id, user_id, user_message, bot_reply, mood, language, created_at) \
             SELECT ?, ?, ?, ?, ?, ?, ? \
             WHERE NOT EXISTS (SELECT 1 FROM conversations WHERE user_message = ?)",
        )
        .bind(conversation.id.to_string())
        .bind(&conversation.user_id)
        .bind(&conversation.user_message)
        .bind(&conversation.bot_reply)
        .bind(conversation.mood.label())
        .bind(&conversation.language)
        .bind(format_timestamp(&conversation.created_at))
        .bind(&conversation.user_message)
        .execute(&self.pool)
        .await
        .map_err(SnorelaxError::from)?;

        let inserted = result.rows_affected() == 1;
        if !inserted {
            debug!("Skipped duplicate message for user {}", conversation.user_id);
        }
        Ok(inserted)
    }

    /// Every conversation of `user_id`, oldest first.
    pub async fn find_by_user(&self, user_id: &str) -> Result<Vec<Conversation>> {
        let rows = sqlx::query(
            "SELECT id, user_id, user_message, bot_reply, mood, language, created_at \
             FROM conversations WHERE user_id = ? \
             ORDER BY created_at ASC, rowid ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(SnorelaxError::from)?;

        rows.iter().map(row_to_conversation).collect()
    }

    /// The newest `limit` conversations of `user_id`, oldest first.
    pub async fn recent_by_user(&self, user_id: &str, limit: i64) -> Result<Vec<Conversation>> {
        let rows = sqlx::query(
            "SELECT id, user_id, user_message, bot_reply, mood, language, created_at \
             FROM conversations WHERE user_id = ? \
             ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(SnorelaxError::from)?;

        let mut conversations = rows
            .iter()
            .map(row_to_conversation)
            .collect::<Result<Vec<_>>>()?;
        conversations.reverse();
        Ok(conversations)
    }

    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM conversations")
            .fetch_one(&self.pool)
            .await
            .map_err(SnorelaxError::from)?;
        Ok(count)
    }
}

/// Fixed-width RFC 3339 so text order matches time order.
fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn row_to_conversation(row: &SqliteRow) -> Result<Conversation> {
    let mood_label: String = row.try_get("mood").map_err(SnorelaxError::from)?;
    let mood = mood_label.parse::<Mood>().unwrap_or_else(|e| {
        warn!("Stored conversation has {}; treating as neutral", e);
        Mood::Neutral
    });
    let id: String = row.try_get("id").map_err(SnorelaxError::from)?;
    let id = Uuid::parse_str(&id)
        .map_err(|e| SnorelaxError::FileSystem(format!("Invalid conversation id '{}': {}", id, e)))?;
    let created_at: String = row.try_get("created_at").map_err(SnorelaxError::from)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| {
            SnorelaxError::FileSystem(format!("Invalid created_at '{}': {}", created_at, e))
        })?
        .with_timezone(&Utc);

    Ok(Conversation {
        id,
        user_id: row.try_get("user_id").map_err(SnorelaxError::from)?,
        user_message: row.try_get("user_message").map_err(SnorelaxError::from)?,
        bot_reply: row.try_get("bot_reply").map_err(SnorelaxError::from)?,
        mood,
        language: row.try_get("language").map_err(SnorelaxError::from)?,
        created_at,
    })
}
