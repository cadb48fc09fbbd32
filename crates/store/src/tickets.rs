//! Ticket gateway: purchase receipts created at checkout.

use {
    chrono::{DateTime, Utc},
    rand::Rng,
    serde::{Deserialize, Serialize},
    sqlx::{Row, SqlitePool, sqlite::SqliteRow},
};

use crate::{StoreError, StoreResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub code: String,
    pub amount: f64,
    pub purchaser: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct Tickets {
    pool: SqlitePool,
}

fn ticket_from_row(row: &SqliteRow) -> Result<Ticket, sqlx::Error> {
    Ok(Ticket {
        id: row.try_get("id")?,
        code: row.try_get("code")?,
        amount: row.try_get("amount")?,
        purchaser: row.try_get("purchaser")?,
        created_at: row.try_get("created_at")?,
    })
}

impl Tickets {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, purchaser: &str, amount: f64) -> StoreResult<Ticket> {
        if purchaser.trim().is_empty() {
            return Err(StoreError::Validation("purchaser must not be empty".into()));
        }
        if amount < 0.0 {
            return Err(StoreError::Validation("amount must not be negative".into()));
        }
        let ticket = Ticket {
            id: uuid::Uuid::new_v4().to_string(),
            code: generate_code(),
            amount,
            purchaser: purchaser.to_string(),
            created_at: Utc::now(),
        };
        sqlx::query(
            "INSERT INTO tickets (id, code, amount, purchaser, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&ticket.id)
        .bind(&ticket.code)
        .bind(ticket.amount)
        .bind(&ticket.purchaser)
        .bind(ticket.created_at)
        .execute(&self.pool)
        .await?;
        Ok(ticket)
    }

    pub async fn get(&self, id: &str) -> StoreResult<Ticket> {
        let row = sqlx::query(
            "SELECT id, code, amount, purchaser, created_at FROM tickets WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound("ticket"))?;
        Ok(ticket_from_row(&row)?)
    }

    pub async fn list_for(&self, purchaser: &str) -> StoreResult<Vec<Ticket>> {
        let rows = sqlx::query(
            "SELECT id, code, amount, purchaser, created_at
             FROM tickets WHERE purchaser = ? ORDER BY rowid",
        )
        .bind(purchaser)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(ticket_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

fn generate_code() -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    let mut rng = rand::rng();
    (0..10)
        .map(|_| {
            let idx = rng.random_range(0..ALPHABET.len());
            ALPHABET[idx] as char
        })
        .collect()
}
