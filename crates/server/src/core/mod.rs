//! Core Service Layer
//!
//! Shared infrastructure for the EmojiPedia server: authentication,
//! data models, configuration, validation, and storage.

pub mod auth;
pub mod config;
pub mod ctx;
pub mod error;
pub mod models;
pub mod router;
pub mod store;
pub mod validation;

// Re-exports for convenience
pub use config::{AppState, ServerConfig};
pub use ctx::Ctx;
pub use error::{Error, Result};
pub use router::router;
