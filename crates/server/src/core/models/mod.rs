use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::auth::{ensure_owner, Owned};
use crate::core::ctx::Ctx;
use crate::core::error::{Error, Result};

/// User record stored in database
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub avatar: String,
    pub date: DateTime<Utc>,
}

/// Public user info (no sensitive data)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub date: DateTime<Utc>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar: user.avatar,
            date: user.date,
        }
    }
}

/// Author details embedded into populated documents
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub email: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            avatar: user.avatar,
            email: user.email,
        }
    }
}

/// Plain confirmation body: `{"msg": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub msg: String,
}

impl Message {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Social {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub from_date: DateTime<Utc>,
    pub to_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_date: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub id: String,
    pub school: String,
    pub degree: String,
    pub field_of_study: String,
    pub from_date: DateTime<Utc>,
    pub to_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_date: bool,
    pub description: Option<String>,
}

/// Editable part of a profile, shared by stored and populated views
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfileDetails {
    pub website: Option<String>,
    pub location: Option<String>,
    pub status: String,
    pub skills: Vec<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub social: Social,
}

/// A user's profile document (one per user)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: String,
    /// Owning user id
    pub user: String,
    #[serde(flatten)]
    pub details: ProfileDetails,
}

impl Owned for Profile {
    const KIND: &'static str = "profile";

    fn owner_id(&self) -> &str {
        &self.user
    }
}

impl Profile {
    pub fn new(user: impl Into<String>, details: ProfileDetails) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user: user.into(),
            details,
        }
    }

    /// Replace the editable fields, keeping experience and education history.
    pub fn apply(&mut self, mut details: ProfileDetails) {
        details.experience = std::mem::take(&mut self.details.experience);
        details.education = std::mem::take(&mut self.details.education);
        self.details = details;
    }

    pub fn add_experience(&mut self, experience: Experience) {
        self.details.experience.insert(0, experience);
    }

    pub fn add_education(&mut self, education: Education) {
        self.details.education.insert(0, education);
    }

    pub fn remove_experience(&mut self, experience_id: &str) -> Result<()> {
        let index = self
            .details
            .experience
            .iter()
            .position(|exp| exp.id == experience_id)
            .ok_or(Error::NotFound {
                resource: "Experiences",
            })?;
        self.details.experience.remove(index);
        Ok(())
    }

    pub fn remove_education(&mut self, education_id: &str) -> Result<()> {
        let index = self
            .details
            .education
            .iter()
            .position(|edu| edu.id == education_id)
            .ok_or(Error::NotFound {
                resource: "Educations",
            })?;
        self.details.education.remove(index);
        Ok(())
    }

    pub fn populate(self, user: Option<UserSummary>) -> ProfileView {
        let user = match user {
            Some(summary) => PopulatedUser::User(summary),
            None => PopulatedUser::Id(self.user),
        };
        ProfileView {
            id: self.id,
            user,
            details: self.details,
        }
    }
}

/// Owner reference that is either resolved or left as a bare id
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PopulatedUser {
    User(UserSummary),
    /// The account no longer exists
    Id(String),
}

/// Profile with the owning user's public details filled in
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub id: String,
    pub user: PopulatedUser,
    #[serde(flatten)]
    pub details: ProfileDetails,
}

// ---------------------------------------------------------------------------
// Emoji posts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Like {
    pub id: String,
    pub user: String,
}

impl Owned for Like {
    const KIND: &'static str = "like";

    fn owner_id(&self) -> &str {
        &self.user
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: String,
    pub user: String,
    pub comment: String,
    pub name: String,
    pub avatar: String,
    pub date: DateTime<Utc>,
}

impl Owned for Comment {
    const KIND: &'static str = "comment";

    fn owner_id(&self) -> &str {
        &self.user
    }
}

impl Comment {
    pub fn new(author: &User, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user: author.id.clone(),
            comment: text.into(),
            name: author.name.clone(),
            avatar: author.avatar.clone(),
            date: Utc::now(),
        }
    }
}

/// An emoji post with its likes and comments
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Emoji {
    pub id: String,
    /// Author user id
    pub user: String,
    pub emoji: String,
    pub title: String,
    pub description: String,
    pub name: String,
    pub avatar: String,
    #[serde(default)]
    pub likes: Vec<Like>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub date: DateTime<Utc>,
}

impl Owned for Emoji {
    const KIND: &'static str = "post";

    fn owner_id(&self) -> &str {
        &self.user
    }
}

impl Emoji {
    pub fn new(
        author: &User,
        emoji: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user: author.id.clone(),
            emoji: emoji.into(),
            title: title.into(),
            description: description.into(),
            name: author.name.clone(),
            avatar: author.avatar.clone(),
            likes: Vec::new(),
            comments: Vec::new(),
            date: Utc::now(),
        }
    }

    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|like| like.is_owned_by(user_id))
    }

    pub fn like(&mut self, user_id: &str) -> Result<()> {
        if self.is_liked_by(user_id) {
            return Err(Error::BadRequest(
                "You have already liked this Emoji!".to_string(),
            ));
        }
        self.likes.insert(
            0,
            Like {
                id: Uuid::new_v4().to_string(),
                user: user_id.to_string(),
            },
        );
        Ok(())
    }

    /// Remove the caller's own like; other users' likes are untouched.
    pub fn unlike(&mut self, user_id: &str) -> Result<()> {
        let index = self
            .likes
            .iter()
            .position(|like| like.is_owned_by(user_id))
            .ok_or_else(|| Error::BadRequest("You haven't liked this Emoji yet!".to_string()))?;
        self.likes.remove(index);
        Ok(())
    }

    pub fn add_comment(&mut self, comment: Comment) {
        self.comments.insert(0, comment);
    }

    /// Remove a comment written by the caller.
    pub fn remove_comment(&mut self, comment_id: &str, ctx: &Ctx) -> Result<()> {
        let index = self
            .comments
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or(Error::NotFound {
                resource: "comments",
            })?;
        ensure_owner(&self.comments[index], ctx)?;
        self.comments.remove(index);
        Ok(())
    }
}
