//! User gateway: account records backing authentication.

use {
    serde::Serialize,
    sqlx::{Row, SqlitePool, sqlite::SqliteRow},
};

use crate::{StoreError, StoreResult};

/// A stored account. The password hash never leaves this crate's callers;
/// it is skipped on serialization.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
}

#[derive(Clone)]
pub struct Users {
    pool: SqlitePool,
}

fn user_from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: row.try_get("role")?,
    })
}

impl Users {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, email: &str, password_hash: &str, role: &str) -> StoreResult<User> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(StoreError::Validation("email is not valid".into()));
        }
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            password_hash: password_hash.to_string(),
            role: role.to_string(),
        };
        let result = sqlx::query(
            "INSERT INTO users (id, email, password_hash, role) VALUES (?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .execute(&self.pool)
        .await;
        match result {
            Ok(_) => Ok(user),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(
                StoreError::Validation("email is already registered".into()),
            ),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, role FROM users WHERE email = ?",
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    pub async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query("SELECT id, email, password_hash, role FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }
}
