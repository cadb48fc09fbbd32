use {
    chrono::{DateTime, Duration, Utc},
    serde::Serialize,
    sqlx::{Row, SqlitePool},
    tracing::debug,
};

/// Session time-to-live. Reads refresh the expiry (sliding window).
pub const SESSION_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    /// Create the store, ensuring the backing table exists.
    pub async fn init(pool: SqlitePool) -> anyhow::Result<Self> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS sessions (
                id         TEXT PRIMARY KEY,
                user_id    TEXT NOT NULL,
                expires_at TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;
        Ok(Self { pool })
    }

    pub async fn create(&self, user_id: &str) -> anyhow::Result<Session> {
        let session = Session {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            expires_at: Utc::now() + Duration::seconds(SESSION_TTL_SECS),
        };
        sqlx::query("INSERT INTO sessions (id, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(&session.id)
            .bind(&session.user_id)
            .bind(session.expires_at)
            .execute(&self.pool)
            .await?;
        Ok(session)
    }

    /// Look up a session. Absent and expired both yield `Ok(None)` — "no
    /// session" is never an error. A live hit refreshes the expiry.
    pub async fn get(&self, id: &str) -> anyhow::Result<Option<Session>> {
        let row = sqlx::query("SELECT id, user_id, expires_at FROM sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let expires_at: DateTime<Utc> = row.try_get("expires_at")?;
        if expires_at <= Utc::now() {
            debug!(session_id = id, "session expired, dropping");
            self.destroy(id).await?;
            return Ok(None);
        }
        let refreshed = Utc::now() + Duration::seconds(SESSION_TTL_SECS);
        sqlx::query("UPDATE sessions SET expires_at = ? WHERE id = ?")
            .bind(refreshed)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(Some(Session {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            expires_at: refreshed,
        }))
    }

    /// Destroy a session. Destroying an unknown id is a no-op.
    pub async fn destroy(&self, id: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Drop every expired record. Returns the number removed.
    pub async fn purge_expired(&self) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
