//! Credential store

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::Store;
use crate::core::error::{Error, Result};
use crate::core::models::User;

impl Store {
    /// Insert a new user. The email must not be registered yet.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        avatar: &str,
    ) -> Result<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            avatar: avatar.to_string(),
            date: Utc::now(),
        };

        let inserted = sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, avatar, date) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.avatar)
        .bind(user.date)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => {
                info!("[Store] User created: {}", user.id);
                Ok(user)
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(Error::DuplicateEmail),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_user(&self, user_id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, avatar, date FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// The user behind a verified token. Gone once the account is deleted,
    /// even though the token itself keeps verifying until it expires.
    pub async fn require_user(&self, user_id: &str) -> Result<User> {
        self.find_user(user_id)
            .await?
            .ok_or(Error::NotFound { resource: "users" })
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, avatar, date FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::temp_store;
    use crate::core::error::Error;

    #[tokio::test]
    async fn test_create_and_find_user() {
        let (_dir, store) = temp_store().await;
        let user = store
            .create_user("Ada", "ada@x.com", "$2b$04$hash", "https://avatar")
            .await
            .unwrap();

        let by_id = store.find_user(&user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "ada@x.com");
        assert_eq!(by_id.password_hash, "$2b$04$hash");

        let by_email = store.find_user_by_email("ada@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        assert!(store.find_user("missing").await.unwrap().is_none());
        assert_eq!(store.require_user(&user.id).await.unwrap().name, "Ada");
        assert!(matches!(
            store.require_user("missing").await,
            Err(Error::NotFound { resource: "users" })
        ));
        assert!(store.find_user_by_email("nobody@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let (_dir, store) = temp_store().await;
        store
            .create_user("Ada", "ada@x.com", "$2b$04$hash", "https://avatar")
            .await
            .unwrap();

        let second = store
            .create_user("Imposter", "ada@x.com", "$2b$04$other", "https://avatar")
            .await;
        assert!(matches!(second, Err(Error::DuplicateEmail)));
    }
}
