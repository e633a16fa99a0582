//! Server configuration

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use uuid::Uuid;

use crate::core::auth::{SecretHasher, TokenIssuer};
use crate::core::store::Store;

/// Default bcrypt work factor.
pub const DEFAULT_HASH_COST: u32 = 10;

/// Configuration for the EmojiPedia server
#[derive(Clone)]
pub struct ServerConfig {
    /// Port to listen on (all interfaces)
    pub port: u16,
    /// Directory holding the SQLite database
    pub data_dir: PathBuf,
    /// HMAC secret used to sign access tokens
    pub token_secret: String,
    /// bcrypt cost factor
    pub hash_cost: u32,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("port", &self.port)
            .field("data_dir", &self.data_dir)
            .field("token_secret", &"<redacted>")
            .field("hash_cost", &self.hash_cost)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from the environment.
    ///
    /// `TOKEN_SECRET` is required; everything else has a default.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("PORT is not a valid port: {raw:?}"))?,
            None => 5000,
        };

        let data_dir = lookup("EMOJIPEDIA_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("emojipedia_data"));

        let token_secret = lookup("TOKEN_SECRET").context("TOKEN_SECRET must be set")?;

        let hash_cost = match lookup("BCRYPT_COST") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("BCRYPT_COST is not a number: {raw:?}"))?,
            None => DEFAULT_HASH_COST,
        };

        let config = Self {
            port,
            data_dir,
            token_secret,
            hash_cost,
        };
        config.validate()?;
        Ok(config)
    }

    /// Create config rooted at a custom directory
    pub fn with_base_dir(base_dir: impl Into<PathBuf>, token_secret: impl Into<String>) -> Self {
        Self {
            port: 0,
            data_dir: base_dir.into(),
            token_secret: token_secret.into(),
            hash_cost: DEFAULT_HASH_COST,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.token_secret.trim().is_empty() {
            bail!("TOKEN_SECRET must not be empty");
        }
        if !(4..=31).contains(&self.hash_cost) {
            bail!("BCRYPT_COST must be between 4 and 31, got {}", self.hash_cost);
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("emojipedia.sqlite")
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    /// Ensure the data directory exists
    pub async fn ensure_dirs(&self) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .with_context(|| format!("creating {:?}", self.data_dir))?;
        Ok(())
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub store: Arc<Store>,
    pub tokens: Arc<TokenIssuer>,
    /// Digest of a random secret, checked on logins for unknown emails.
    pub decoy_digest: Arc<str>,
}

impl AppState {
    /// Open the store and build the token issuer for `config`.
    pub async fn new(config: ServerConfig) -> anyhow::Result<Self> {
        config.validate()?;
        config.ensure_dirs().await?;

        let store = Store::open(&config.database_path()).await?;
        let tokens = TokenIssuer::new(config.token_secret.as_bytes());
        let decoy_digest = SecretHasher::new(config.hash_cost)
            .hash_async(Uuid::new_v4().to_string())
            .await
            .context("hashing decoy password")?;

        Ok(Self {
            config: Arc::new(config),
            store: Arc::new(store),
            tokens: Arc::new(tokens),
            decoy_digest: decoy_digest.into(),
        })
    }

    pub fn hasher(&self) -> SecretHasher {
        SecretHasher::new(self.config.hash_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[("TOKEN_SECRET", "s3cret")])).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.data_dir, PathBuf::from("emojipedia_data"));
        assert_eq!(config.hash_cost, DEFAULT_HASH_COST);
        assert!(config.database_path().ends_with("emojipedia.sqlite"));
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let result = ServerConfig::from_lookup(lookup_from(&[("PORT", "8080")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_values_are_rejected() {
        assert!(ServerConfig::from_lookup(lookup_from(&[
            ("TOKEN_SECRET", "s3cret"),
            ("PORT", "not-a-port"),
        ]))
        .is_err());
        assert!(ServerConfig::from_lookup(lookup_from(&[
            ("TOKEN_SECRET", "s3cret"),
            ("BCRYPT_COST", "2"),
        ]))
        .is_err());
        assert!(ServerConfig::from_lookup(lookup_from(&[("TOKEN_SECRET", "  ")])).is_err());
    }

    #[tokio::test]
    async fn test_decoy_digest_uses_configured_cost() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = ServerConfig::with_base_dir(dir.path(), "s3cret");
        config.hash_cost = 4;
        let state = AppState::new(config).await.unwrap();

        assert!(state.decoy_digest.starts_with("$2b$04$"));
        assert!(!state
            .hasher()
            .verify_async("password1".to_string(), state.decoy_digest.to_string())
            .await
            .unwrap());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = ServerConfig::with_base_dir("/tmp/x", "hunter2");
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
