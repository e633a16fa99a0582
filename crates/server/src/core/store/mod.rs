//! Document storage
//!
//! SQLite-backed store. Users are plain rows; profiles and emoji posts are
//! stored as whole JSON documents keyed by id, with the owning user id
//! duplicated into its own column for lookups and the account cascade.
//! Every read or write touches a single document.
//!
//! Document changes are compare-and-swap: the new document is written only if
//! the stored one is still the one that was read, otherwise the change is
//! re-applied to the fresh copy.

mod emojis;
mod profiles;
mod users;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::info;

use crate::core::error::{Error, Result};

/// Attempts before a contended document update gives up.
const MAX_WRITE_ATTEMPTS: usize = 16;

pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if needed) the database at `db_path`.
    pub async fn open(db_path: &Path) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| format!("opening database at {:?}", db_path))?;

        let store = Self { pool };
        store.init_db().await.context("initializing schema")?;

        info!("[Store] Initialized at {:?}", db_path);
        Ok(store)
    }

    async fn init_db(&self) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                avatar TEXT NOT NULL,
                date TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY,
                user_id TEXT UNIQUE NOT NULL,
                doc TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS emojis (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                date INTEGER NOT NULL,
                doc TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS emojis_user_id ON emojis (user_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Remove a user together with their profile and emoji posts.
    ///
    /// Runs in one transaction: either everything goes or nothing does.
    pub async fn delete_account(&self, user_id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let posts = sqlx::query("DELETE FROM emojis WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("[Store] Account {} removed ({} posts)", user_id, posts);
        Ok(())
    }

    fn contended(kind: &str, id: &str) -> Error {
        Error::Internal(format!("{} {} kept changing during update", kind, id))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Store;
    use tempfile::TempDir;

    pub async fn temp_store() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(&dir.path().join("test.sqlite")).await.unwrap();
        (dir, store)
    }
}
