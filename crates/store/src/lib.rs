//! SQLite-backed store gateways.
//!
//! One `SqlitePool` is constructed at bootstrap and injected into every
//! gateway; tests substitute `sqlite::memory:`. Each gateway is a thin
//! façade over one collection — no retries, no cross-gateway orchestration.

pub mod carts;
pub mod catalog;
pub mod messages;
pub mod tickets;
pub mod users;

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing::info;

pub use {
    carts::{Cart, CartItem, Carts},
    catalog::{CatalogStore, ListFilter, PageQuery, PriceSort, SqliteCatalog},
    messages::{MessageStore, SqliteMessages},
    tickets::{Ticket, Tickets},
    users::{User, Users},
};

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Malformed or missing input; maps to HTTP 400.
    #[error("validation error: {0}")]
    Validation(String),
    /// Unknown identifier; maps to HTTP 404.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// The underlying store rejected the operation; maps to HTTP 500.
    #[error("store error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

// ── Connection ───────────────────────────────────────────────────────────────

/// Connect to the store and create the schema idempotently.
///
/// `url` accepts any sqlx SQLite URL, including `sqlite::memory:`.
pub async fn connect(url: &str) -> StoreResult<SqlitePool> {
    let options: SqliteConnectOptions = url
        .parse::<SqliteConnectOptions>()
        .map_err(sqlx::Error::from)?
        .create_if_missing(true)
        .foreign_keys(true);
    // Each pooled connection to `:memory:` would get its own database, so
    // in-memory stores are pinned to a single connection.
    let max_connections = if url.contains(":memory:") { 1 } else { 5 };
    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(max_connections)
        .connect_with(options)
        .await?;
    create_schema(&pool).await?;
    info!(url, "store connected");
    Ok(pool)
}

async fn create_schema(pool: &SqlitePool) -> StoreResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS products (
            id          TEXT PRIMARY KEY,
            title       TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            price       REAL NOT NULL,
            stock       INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
            category    TEXT NOT NULL DEFAULT '',
            thumbnails  TEXT NOT NULL DEFAULT '[]'
        )",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS messages (
            seq        INTEGER PRIMARY KEY AUTOINCREMENT,
            id         TEXT NOT NULL UNIQUE,
            sender     TEXT NOT NULL,
            body       TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE TABLE IF NOT EXISTS carts (id TEXT PRIMARY KEY)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS cart_items (
            cart_id    TEXT NOT NULL REFERENCES carts(id) ON DELETE CASCADE,
            product_id TEXT NOT NULL REFERENCES products(id),
            quantity   INTEGER NOT NULL CHECK (quantity > 0),
            PRIMARY KEY (cart_id, product_id)
        )",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS tickets (
            id         TEXT PRIMARY KEY,
            code       TEXT NOT NULL UNIQUE,
            amount     REAL NOT NULL,
            purchaser  TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id            TEXT PRIMARY KEY,
            email         TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role          TEXT NOT NULL DEFAULT 'user'
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_creates_schema_idempotently() {
        let pool = connect("sqlite::memory:").await.unwrap();
        // Running schema creation again must be a no-op.
        create_schema(&pool).await.unwrap();
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }
}
