//! Account repository.
//!
//! Stores one row per username with the password digest computed by the
//! connection handshake. Plaintext passwords never reach this layer.

use super::DbError;
use sqlx::SqlitePool;

/// Repository for account operations.
pub struct AccountRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert the account if the username is free.
    ///
    /// Returns `false` without touching the existing row when the username is
    /// already taken.
    pub async fn register(&self, username: &str, password_hash: &str) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO users (username, password_hash)
            VALUES (?, ?)
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Check that `username` exists and its stored digest equals `password_hash`.
    pub async fn verify(&self, username: &str, password_hash: &str) -> Result<bool, DbError> {
        let stored = sqlx::query_scalar::<_, String>(
            r#"
            SELECT password_hash FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(stored.is_some_and(|hash| hash == password_hash))
    }
}
