//! Emoji post handlers

use crate::core::auth::ensure_owner;
use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::{Error, Result};
use crate::core::models::{Comment, Emoji, Like, Message, User};
use crate::core::validation::{Payload, Validator};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

const NO_EMOJIS: Error = Error::NotFound { resource: "Emojis" };

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateEmojiRequest {
    pub emoji: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CommentRequest {
    pub text: Option<String>,
}

async fn load_emoji(state: &AppState, emoji_id: &str) -> Result<Emoji> {
    state.store.find_emoji(emoji_id).await?.ok_or(NO_EMOJIS)
}

/// The caller's account. A token outlives a deleted account, so every write
/// checks the user still exists.
async fn load_author(state: &AppState, ctx: &Ctx) -> Result<User> {
    state.store.require_user(ctx.user_id()).await
}

/// POST /api/emoji
pub async fn create_emoji(
    State(state): State<AppState>,
    ctx: Ctx,
    Payload(req): Payload<CreateEmojiRequest>,
) -> Result<Json<Emoji>> {
    let mut v = Validator::new();
    let emoji = v.not_empty("emoji", req.emoji.as_deref(), "Emoji is a required field!");
    let title = v.not_empty("title", req.title.as_deref(), "Post Title is a required field!");
    let description = v.not_empty(
        "description",
        req.description.as_deref(),
        "Post Description is a required field!",
    );
    v.finish()?;

    let author = load_author(&state, &ctx).await?;
    let post = Emoji::new(&author, emoji, title, description);
    state.store.insert_emoji(&post).await?;

    info!("POST /api/emoji - {} by {}", post.id, author.id);
    Ok(Json(post))
}

/// GET /api/emoji, GET /api/emoji/emojies
pub async fn list_emojis(State(state): State<AppState>) -> Result<Json<Vec<Emoji>>> {
    Ok(Json(state.store.list_emojis().await?))
}

/// GET /api/emoji/{id}
pub async fn get_emoji(
    State(state): State<AppState>,
    Path(emoji_id): Path<String>,
) -> Result<Json<Emoji>> {
    Ok(Json(load_emoji(&state, &emoji_id).await?))
}

/// DELETE /api/emoji/{id}
pub async fn delete_emoji(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(emoji_id): Path<String>,
) -> Result<Json<Message>> {
    let post = load_emoji(&state, &emoji_id).await?;
    ensure_owner(&post, &ctx)?;

    state.store.delete_emoji(&post.id).await?;

    info!("DELETE /api/emoji/{} by {}", post.id, ctx.user_id());
    Ok(Json(Message::new("Emoji Post was successfully deleted!")))
}

/// PUT /api/emoji/like/{id}
pub async fn like_emoji(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(emoji_id): Path<String>,
) -> Result<Json<Vec<Like>>> {
    load_author(&state, &ctx).await?;
    let post = state
        .store
        .modify_emoji(&emoji_id, |post| post.like(ctx.user_id()))
        .await?
        .ok_or(NO_EMOJIS)?;

    Ok(Json(post.likes))
}

/// PUT /api/emoji/unlike/{id}
pub async fn unlike_emoji(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(emoji_id): Path<String>,
) -> Result<Json<Vec<Like>>> {
    load_author(&state, &ctx).await?;
    let post = state
        .store
        .modify_emoji(&emoji_id, |post| post.unlike(ctx.user_id()))
        .await?
        .ok_or(NO_EMOJIS)?;

    Ok(Json(post.likes))
}

/// POST /api/emoji/comment/{id}
pub async fn add_comment(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(emoji_id): Path<String>,
    Payload(req): Payload<CommentRequest>,
) -> Result<Json<Vec<Comment>>> {
    let mut v = Validator::new();
    let text = v.not_empty("text", req.text.as_deref(), "Comment Text is a required field!");
    v.finish()?;

    let author = load_author(&state, &ctx).await?;
    let comment = Comment::new(&author, text);
    let post = state
        .store
        .modify_emoji(&emoji_id, |post| {
            post.add_comment(comment.clone());
            Ok(())
        })
        .await?
        .ok_or(NO_EMOJIS)?;

    Ok(Json(post.comments))
}

/// DELETE /api/emoji/comment/{id}/{comment_id}
pub async fn delete_comment(
    State(state): State<AppState>,
    ctx: Ctx,
    Path((emoji_id, comment_id)): Path<(String, String)>,
) -> Result<Json<Vec<Comment>>> {
    let post = state
        .store
        .modify_emoji(&emoji_id, |post| post.remove_comment(&comment_id, &ctx))
        .await?
        .ok_or(NO_EMOJIS)?;

    Ok(Json(post.comments))
}
