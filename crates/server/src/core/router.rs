//! Core Router
//!
//! Registration, login, and the current-user lookup.

use crate::core::auth::handlers as auth_handlers;
use crate::core::auth::mw_require_auth;
use crate::core::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub fn router(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/api/user", post(auth_handlers::register))
        .route("/api/login", post(auth_handlers::login));

    let protected = Router::new()
        .route("/api/login", get(auth_handlers::me))
        .route_layer(middleware::from_fn_with_state(state.clone(), mw_require_auth));

    public.merge(protected)
}
