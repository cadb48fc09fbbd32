//! Message gateway: append-only chat log.

use {
    async_trait::async_trait,
    chrono::Utc,
    sqlx::{Row, SqlitePool, sqlite::SqliteRow},
};

use tienda_protocol::ChatMessage;

use crate::{StoreError, StoreResult};

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Every message ever written, in creation order.
    async fn list_all(&self) -> StoreResult<Vec<ChatMessage>>;
    /// Append one message. Rejects an empty sender or body.
    async fn append(&self, sender: &str, body: &str) -> StoreResult<ChatMessage>;
}

#[derive(Clone)]
pub struct SqliteMessages {
    pool: SqlitePool,
}

impl SqliteMessages {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn message_from_row(row: &SqliteRow) -> Result<ChatMessage, sqlx::Error> {
    Ok(ChatMessage {
        id: row.try_get("id")?,
        sender: row.try_get("sender")?,
        body: row.try_get("body")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl MessageStore for SqliteMessages {
    async fn list_all(&self) -> StoreResult<Vec<ChatMessage>> {
        let rows =
            sqlx::query("SELECT id, sender, body, created_at FROM messages ORDER BY seq")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows
            .iter()
            .map(message_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn append(&self, sender: &str, body: &str) -> StoreResult<ChatMessage> {
        if sender.trim().is_empty() {
            return Err(StoreError::Validation("sender must not be empty".into()));
        }
        if body.trim().is_empty() {
            return Err(StoreError::Validation("body must not be empty".into()));
        }
        let message = ChatMessage {
            id: uuid::Uuid::new_v4().to_string(),
            sender: sender.to_string(),
            body: body.to_string(),
            created_at: Utc::now(),
        };
        sqlx::query("INSERT INTO messages (id, sender, body, created_at) VALUES (?, ?, ?, ?)")
            .bind(&message.id)
            .bind(&message.sender)
            .bind(&message.body)
            .bind(message.created_at)
            .execute(&self.pool)
            .await?;
        Ok(message)
    }
}
