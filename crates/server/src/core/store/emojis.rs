use tracing::debug;

use super::{Store, MAX_WRITE_ATTEMPTS};
use crate::core::error::Result;
use crate::core::models::Emoji;

fn decode(rows: Vec<(String,)>) -> Result<Vec<Emoji>> {
    rows.into_iter()
        .map(|(doc,)| serde_json::from_str(&doc).map_err(Into::into))
        .collect()
}

impl Store {
    pub async fn insert_emoji(&self, emoji: &Emoji) -> Result<()> {
        let doc = serde_json::to_string(emoji)?;
        sqlx::query("INSERT INTO emojis (id, user_id, date, doc) VALUES (?, ?, ?, ?)")
            .bind(&emoji.id)
            .bind(&emoji.user)
            .bind(emoji.date.timestamp_micros())
            .bind(doc)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn find_emoji(&self, emoji_id: &str) -> Result<Option<Emoji>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT doc FROM emojis WHERE id = ?")
            .bind(emoji_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|(doc,)| serde_json::from_str(&doc).map_err(Into::into))
            .transpose()
    }

    /// All posts, newest first.
    pub async fn list_emojis(&self) -> Result<Vec<Emoji>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT doc FROM emojis ORDER BY date DESC")
            .fetch_all(&self.pool)
            .await?;
        decode(rows)
    }

    /// Apply `change` (likes, comments) to a post and write it back.
    ///
    /// `Ok(None)` if the post does not exist. An error from `change` leaves
    /// the stored document untouched.
    pub async fn modify_emoji<F>(&self, emoji_id: &str, mut change: F) -> Result<Option<Emoji>>
    where
        F: FnMut(&mut Emoji) -> Result<()>,
    {
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let row: Option<(String,)> = sqlx::query_as("SELECT doc FROM emojis WHERE id = ?")
                .bind(emoji_id)
                .fetch_optional(&self.pool)
                .await?;
            let Some((current,)) = row else {
                return Ok(None);
            };

            let mut emoji: Emoji = serde_json::from_str(&current)?;
            change(&mut emoji)?;
            let doc = serde_json::to_string(&emoji)?;

            let result = sqlx::query("UPDATE emojis SET doc = ? WHERE id = ? AND doc = ?")
                .bind(doc)
                .bind(emoji_id)
                .bind(&current)
                .execute(&self.pool)
                .await?;
            if result.rows_affected() == 1 {
                return Ok(Some(emoji));
            }
            debug!("[Store] Emoji {} changed concurrently, retrying", emoji_id);
        }
        Err(Self::contended("emoji", emoji_id))
    }

    pub async fn delete_emoji(&self, emoji_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM emojis WHERE id = ?")
            .bind(emoji_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::temp_store;
    use crate::core::models::{Comment, Emoji, User};
    use chrono::{Duration, Utc};
    use std::sync::Arc;

    fn author() -> User {
        User {
            id: "alice".into(),
            name: "Alice".into(),
            email: "alice@x.com".into(),
            password_hash: "$2b$04$hash".into(),
            avatar: "https://avatar".into(),
            date: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let (_dir, store) = temp_store().await;
        let mut older = Emoji::new(&author(), "🐢", "old", "slow");
        older.date = Utc::now() - Duration::hours(1);
        let newer = Emoji::new(&author(), "🚀", "new", "fast");

        store.insert_emoji(&older).await.unwrap();
        store.insert_emoji(&newer).await.unwrap();

        let titles: Vec<String> = store
            .list_emojis()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (_dir, store) = temp_store().await;
        let emoji = Emoji::new(&author(), "🦀", "Crab", "Rust");
        store.insert_emoji(&emoji).await.unwrap();

        let changed = store
            .modify_emoji(&emoji.id, |post| {
                post.like("bob")?;
                post.add_comment(Comment::new(&author(), "first!"));
                Ok(())
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(changed.likes.len(), 1);

        let loaded = store.find_emoji(&emoji.id).await.unwrap().unwrap();
        assert_eq!(loaded, changed);

        // Rejected change is not written
        let again = store.modify_emoji(&emoji.id, |post| post.like("bob")).await;
        assert!(again.is_err());
        let loaded = store.find_emoji(&emoji.id).await.unwrap().unwrap();
        assert_eq!(loaded, changed);

        assert!(store.delete_emoji(&emoji.id).await.unwrap());
        assert!(!store.delete_emoji(&emoji.id).await.unwrap());
        assert!(store.find_emoji(&emoji.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_modify_missing_post() {
        let (_dir, store) = temp_store().await;
        let result = store.modify_emoji("missing", |_| Ok(())).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_likes_are_all_kept() {
        let (_dir, store) = temp_store().await;
        let store = Arc::new(store);
        let emoji = Emoji::new(&author(), "🦀", "Crab", "Rust");
        store.insert_emoji(&emoji).await.unwrap();

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                let id = emoji.id.clone();
                tokio::spawn(async move {
                    let user = format!("user{i}");
                    store.modify_emoji(&id, |post| post.like(&user)).await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap().unwrap();
        }

        let loaded = store.find_emoji(&emoji.id).await.unwrap().unwrap();
        assert_eq!(loaded.likes.len(), 8);
    }
}
