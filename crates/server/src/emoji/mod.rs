//! Emoji Posts
//!
//! Posts, likes and comments. Reading the public feed needs no token;
//! everything else goes through the auth middleware.

pub mod handlers;

use crate::core::auth::mw_require_auth;
use crate::core::AppState;
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

pub fn router(state: &AppState) -> Router<AppState> {
    let public = Router::new().route("/api/emoji", get(handlers::list_emojis));

    let protected = Router::new()
        .route("/api/emoji", post(handlers::create_emoji))
        .route("/api/emoji/emojies", get(handlers::list_emojis))
        .route(
            "/api/emoji/{id}",
            get(handlers::get_emoji).delete(handlers::delete_emoji),
        )
        .route("/api/emoji/like/{id}", put(handlers::like_emoji))
        .route("/api/emoji/unlike/{id}", put(handlers::unlike_emoji))
        .route("/api/emoji/comment/{id}", post(handlers::add_comment))
        .route(
            "/api/emoji/comment/{id}/{comment_id}",
            delete(handlers::delete_comment),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), mw_require_auth));

    public.merge(protected)
}
