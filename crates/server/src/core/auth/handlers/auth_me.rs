use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::Result;
use crate::core::models::UserInfo;
use axum::extract::State;
use axum::Json;

/// GET /api/login
pub async fn me(State(state): State<AppState>, ctx: Ctx) -> Result<Json<UserInfo>> {
    // Ctx is only present once the middleware has verified the token.
    let user = state.store.require_user(ctx.user_id()).await?;
    Ok(Json(user.into()))
}
