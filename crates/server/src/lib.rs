//! EmojiPedia Server Library
//!
//! JSON API for users, profiles, and emoji posts, guarded by stateless
//! access tokens.

pub mod core;
pub mod emoji;
pub mod profile;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub use crate::core::{AppState, ServerConfig};

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(welcome))
        .merge(crate::core::router(&state))
        .merge(emoji::router(&state))
        .merge(profile::router(&state))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(tower_http::trace::TraceLayer::new_for_http())
                .layer(tower_http::cors::CorsLayer::permissive()),
        )
}

pub async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_err()
    {
        // Already set, ignore
    }

    info!("=== EmojiPedia Server ===");

    let config = ServerConfig::from_env()?;
    info!("Data directory: {:?}", config.data_dir);

    let addr = config.listen_addr();
    let state = AppState::new(config).await?;
    let app = app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("The server has been started on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn welcome() -> &'static str {
    "Welcome to my EmojiPedia"
}
