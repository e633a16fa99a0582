//! Authentication Module
//!
//! Registration, login, and the pieces protected routes are built on:
//! password hashing, stateless access tokens, the `access-token` guard and
//! the ownership policy.

pub mod handlers;
pub mod middleware;
pub mod ownership;
pub mod password;
pub mod token;

pub use middleware::{mw_require_auth, TOKEN_HEADER};
pub use ownership::{ensure_owner, Owned};
pub use password::{SecretHasher, MAX_PASSWORD_BYTES};
pub use token::{TokenError, TokenIssuer, TOKEN_LIFETIME};

use sha2::{Digest, Sha256};

/// Gravatar URL for `email` (200px, PG rated, mystery-person fallback).
pub fn gravatar_url(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    format!(
        "https://www.gravatar.com/avatar/{:x}?s=200&r=pg&d=mm",
        digest
    )
}
