//! Registration and login handlers

use crate::core::auth::{gravatar_url, MAX_PASSWORD_BYTES};
use crate::core::config::AppState;
use crate::core::error::{Error, Result};
use crate::core::models::{User, UserInfo};
use crate::core::validation::{Payload, Validator};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_CHARS: usize = 8;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
}

fn respond(state: &AppState, user: User) -> Result<Json<AuthResponse>> {
    let token = state.tokens.issue(&user.id)?;
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// POST /api/user
pub async fn register(
    State(state): State<AppState>,
    Payload(req): Payload<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    let mut v = Validator::new();
    let name = v.not_empty("name", req.name.as_deref(), "Name is a required field!");
    let email = v.email("email", req.email.as_deref(), "Email is a required field!");
    let password = v.min_chars(
        "password",
        req.password.as_deref(),
        MIN_PASSWORD_CHARS,
        "Password is a required field, with minimum 8 characters!",
    );
    v.max_bytes(
        "password",
        req.password.as_deref(),
        MAX_PASSWORD_BYTES,
        "Password can be at most 71 bytes long!",
    );
    v.finish()?;

    info!("POST /api/user - {}", email);

    if state.store.find_user_by_email(&email).await?.is_some() {
        warn!("Signup rejected, email in use: {}", email);
        return Err(Error::DuplicateEmail);
    }

    let avatar = gravatar_url(&email);
    let password_hash = state.hasher().hash_async(password).await?;

    let user = state
        .store
        .create_user(&name, &email, &password_hash, &avatar)
        .await?;

    info!("[Auth] User registered: {} ({})", user.id, email);
    respond(&state, user)
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Payload(req): Payload<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let mut v = Validator::new();
    let email = v.email("email", req.email.as_deref(), "Email is a required field!");
    let password = v.present("password", req.password.as_deref(), "Password is a required field!");
    v.finish()?;

    info!("POST /api/login - {}", email);

    let user = state.store.find_user_by_email(&email).await?;

    // Unknown emails still pay for one bcrypt check.
    let digest = match &user {
        Some(user) => user.password_hash.clone(),
        None => state.decoy_digest.to_string(),
    };
    let valid = state.hasher().verify_async(password, digest).await?;

    match user {
        Some(user) if valid => {
            info!("[Auth] User logged in: {}", user.id);
            respond(&state, user)
        }
        _ => {
            warn!("[Auth] Failed login attempt for {}", email);
            Err(Error::LoginFail)
        }
    }
}
