//! SQLite-backed user table.

use crate::domain::model::User;
use crate::utils::error::{Result, SyncError};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;

const CREATE_USERS_TABLE: &str = "CREATE TABLE IF NOT EXISTS users (
    username TEXT PRIMARY KEY NOT NULL,
    password_hash TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1
)";

#[derive(Debug, Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// 單一連線的記憶體資料庫，測試用
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(CREATE_USERS_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn find(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT username, password_hash, is_active FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| User {
            username: row.get("username"),
            password_hash: row.get("password_hash"),
            is_active: row.get::<i64, _>("is_active") != 0,
        }))
    }

    /// Inserts the user unless the username already exists. Returns whether
    /// a row was written.
    pub async fn seed(&self, username: &str, password: &str, is_active: bool) -> Result<bool> {
        let password_hash = hash_password(password)?;
        let result = sqlx::query(
            "INSERT OR IGNORE INTO users (username, password_hash, is_active) VALUES (?, ?, ?)",
        )
        .bind(username)
        .bind(password_hash)
        .bind(is_active as i64)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| SyncError::PasswordHash {
            message: e.to_string(),
        })
}

/// Verifies `password` against a stored Argon2 PHC string. A malformed hash
/// never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
