//! Password hashing (bcrypt)

use bcrypt::{non_truncating_hash, non_truncating_verify, BcryptError, BcryptResult};
use tokio::task::spawn_blocking;

use crate::core::config::DEFAULT_HASH_COST;
use crate::core::error::Result;

/// Longest password bcrypt hashes in full (72 key bytes, one of them the
/// terminating NUL).
pub const MAX_PASSWORD_BYTES: usize = 71;

/// Salted one-way password hashing.
///
/// Every call to [`SecretHasher::hash`] draws a fresh random salt, so the same
/// password never produces the same digest twice. Both operations are slow by
/// design of bcrypt and should run off the async executor.
#[derive(Debug, Clone, Copy)]
pub struct SecretHasher {
    cost: u32,
}

impl SecretHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Fails with `BcryptError::Truncation` past [`MAX_PASSWORD_BYTES`].
    pub fn hash(&self, plaintext: &str) -> BcryptResult<String> {
        non_truncating_hash(plaintext, self.cost)
    }

    /// Returns `Ok(false)` for a wrong password; `Err` only for an unreadable digest.
    ///
    /// A password too long to have been hashed can never match.
    pub fn verify(&self, plaintext: &str, digest: &str) -> BcryptResult<bool> {
        match non_truncating_verify(plaintext, digest) {
            Err(BcryptError::Truncation(_)) => Ok(false),
            other => other,
        }
    }

    /// [`hash`](Self::hash) on the blocking thread pool.
    pub async fn hash_async(self, plaintext: String) -> Result<String> {
        Ok(spawn_blocking(move || self.hash(&plaintext)).await??)
    }

    /// [`verify`](Self::verify) on the blocking thread pool.
    pub async fn verify_async(self, plaintext: String, digest: String) -> Result<bool> {
        Ok(spawn_blocking(move || self.verify(&plaintext, &digest)).await??)
    }
}

impl Default for SecretHasher {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_COST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum bcrypt cost keeps the suite fast.
    fn hasher() -> SecretHasher {
        SecretHasher::new(4)
    }

    #[test]
    fn test_hash_then_verify() {
        let hasher = hasher();
        let digest = hasher.hash("password1").unwrap();

        assert_ne!(digest, "password1");
        assert!(hasher.verify("password1", &digest).unwrap());
        assert!(!hasher.verify("password2", &digest).unwrap());
        assert!(!hasher.verify("", &digest).unwrap());
    }

    #[test]
    fn test_salt_is_fresh_per_call() {
        let hasher = hasher();
        let first = hasher.hash("password1").unwrap();
        let second = hasher.hash("password1").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("password1", &second).unwrap());
    }

    #[test]
    fn test_cost_is_encoded_in_digest() {
        let digest = hasher().hash("password1").unwrap();
        assert!(digest.starts_with("$2b$04$"));
        assert_eq!(SecretHasher::default().cost(), 10);
    }

    #[tokio::test]
    async fn test_async_variants() {
        let hasher = hasher();
        let digest = hasher.hash_async("password1".to_string()).await.unwrap();

        assert!(hasher
            .verify_async("password1".to_string(), digest.clone())
            .await
            .unwrap());
        assert!(!hasher
            .verify_async("password2".to_string(), digest)
            .await
            .unwrap());
    }

    #[test]
    fn test_shared_long_prefix_does_not_match() {
        let hasher = hasher();
        let prefix = "a".repeat(MAX_PASSWORD_BYTES);
        let digest = hasher.hash(&prefix).unwrap();

        assert!(hasher.verify(&prefix, &digest).unwrap());
        assert!(!hasher.verify(&format!("{prefix}WRONG"), &digest).unwrap());
        assert!(!hasher.verify(&format!("{prefix}correct-horse"), &digest).unwrap());
    }

    #[test]
    fn test_overlong_password_is_not_hashed() {
        let long = format!("{}correct-horse", "a".repeat(MAX_PASSWORD_BYTES));
        assert!(matches!(
            hasher().hash(&long),
            Err(BcryptError::Truncation(_))
        ));
    }

    #[test]
    fn test_garbage_digest_is_an_error() {
        assert!(hasher().verify("password1", "not-a-bcrypt-hash").is_err());
    }
}
