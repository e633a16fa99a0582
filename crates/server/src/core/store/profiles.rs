use tracing::debug;

use super::{Store, MAX_WRITE_ATTEMPTS};
use crate::core::error::Result;
use crate::core::models::{Profile, ProfileView, UserSummary};

type PopulatedRow = (
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

fn populate_row((doc, id, name, avatar, email): PopulatedRow) -> Result<ProfileView> {
    let profile: Profile = serde_json::from_str(&doc)?;
    let user = match (id, name, avatar, email) {
        (Some(id), Some(name), Some(avatar), Some(email)) => Some(UserSummary {
            id,
            name,
            avatar,
            email,
        }),
        _ => None,
    };
    Ok(profile.populate(user))
}

impl Store {
    pub async fn find_profile_by_user(&self, user_id: &str) -> Result<Option<Profile>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT doc FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|(doc,)| serde_json::from_str(&doc).map_err(Into::into))
            .transpose()
    }

    /// Profile with its owner's public details.
    pub async fn find_profile_view(&self, user_id: &str) -> Result<Option<ProfileView>> {
        let row: Option<PopulatedRow> = sqlx::query_as(
            r#"
            SELECT p.doc, u.id, u.name, u.avatar, u.email
            FROM profiles p
            LEFT JOIN users u ON u.id = p.user_id
            WHERE p.user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(populate_row).transpose()
    }

    pub async fn list_profile_views(&self) -> Result<Vec<ProfileView>> {
        let rows: Vec<PopulatedRow> = sqlx::query_as(
            r#"
            SELECT p.doc, u.id, u.name, u.avatar, u.email
            FROM profiles p
            LEFT JOIN users u ON u.id = p.user_id
            "#,
        )
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(populate_row).collect()
    }

    /// Store a first profile for its user. `false` if the user already has one.
    pub async fn insert_profile(&self, profile: &Profile) -> Result<bool> {
        let doc = serde_json::to_string(profile)?;
        let result = sqlx::query(
            r#"
            INSERT INTO profiles (id, user_id, doc) VALUES (?, ?, ?)
            ON CONFLICT(user_id) DO NOTHING
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.user)
        .bind(doc)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Apply `change` to `user_id`'s profile and write it back.
    ///
    /// `Ok(None)` if the user has no profile. An error from `change` leaves
    /// the stored document untouched.
    pub async fn modify_profile<F>(&self, user_id: &str, mut change: F) -> Result<Option<Profile>>
    where
        F: FnMut(&mut Profile) -> Result<()>,
    {
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let row: Option<(String,)> =
                sqlx::query_as("SELECT doc FROM profiles WHERE user_id = ?")
                    .bind(user_id)
                    .fetch_optional(&self.pool)
                    .await?;
            let Some((current,)) = row else {
                return Ok(None);
            };

            let mut profile: Profile = serde_json::from_str(&current)?;
            change(&mut profile)?;
            let doc = serde_json::to_string(&profile)?;

            let result = sqlx::query("UPDATE profiles SET doc = ? WHERE user_id = ? AND doc = ?")
                .bind(doc)
                .bind(user_id)
                .bind(&current)
                .execute(&self.pool)
                .await?;
            if result.rows_affected() == 1 {
                return Ok(Some(profile));
            }
            debug!("[Store] Profile of {} changed concurrently, retrying", user_id);
        }
        Err(Self::contended("profile of", user_id))
    }
}
