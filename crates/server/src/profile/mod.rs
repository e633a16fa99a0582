//! Profiles
//!
//! One profile per user, with experience and education history. The
//! account deletion cascade lives here too since it is exposed as
//! `DELETE /api/profile`.

pub mod handlers;

use crate::core::auth::mw_require_auth;
use crate::core::AppState;
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

pub fn router(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/api/profile/profiles", get(handlers::list_profiles))
        .route("/api/profile/user/{user_id}", get(handlers::profile_by_user));

    let protected = Router::new()
        .route("/api/profile/me", get(handlers::my_profile))
        .route(
            "/api/profile",
            post(handlers::upsert_profile).delete(handlers::delete_account),
        )
        .route("/api/profile/experience", put(handlers::add_experience))
        .route("/api/profile/education", put(handlers::add_education))
        .route(
            "/api/profile/experience/{exp_id}",
            delete(handlers::delete_experience),
        )
        .route(
            "/api/profile/education/{edu_id}",
            delete(handlers::delete_education),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), mw_require_auth));

    public.merge(protected)
}
