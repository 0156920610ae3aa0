//! Password Verification
//!
//! The login handler never compares passwords itself. It asks a
//! [`PasswordVerifier`] whether a candidate matches the stored hash, which
//! keeps the hash format an implementation detail of the credential store.
//!
//! [`BcryptVerifier`] is the default. bcrypt is CPU-bound, so
//! verification runs on tokio's blocking pool instead of the async workers.
//!
//! # Usage
//!
//! ```ignore
//! use tollgate::password::{hash_password, BcryptVerifier, PasswordVerifier};
//!
//! let hash = hash_password("correct horse battery staple", 12).await?;
//! let ok = BcryptVerifier.verify("correct horse battery staple", &hash).await?;
//! assert!(ok);
//! ```

use async_trait::async_trait;
use thiserror::Error;

/// Default bcrypt cost factor for new hashes.
pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordError {
    /// The stored hash is not in a format the verifier understands
    #[error("invalid stored hash: {0}")]
    InvalidHash(String),

    /// Hashing failed (bad cost, oversized input)
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// The blocking task panicked or was cancelled
    #[error("password task failed: {0}")]
    Task(String),
}

/// Checks a candidate password against a stored hash.
#[async_trait]
pub trait PasswordVerifier: Send + Sync {
    /// `Ok(true)` on match, `Ok(false)` on mismatch.
    async fn verify(&self, candidate: &str, stored_hash: &str) -> Result<bool, PasswordError>;
}

/// bcrypt-backed verifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct BcryptVerifier;

#[async_trait]
impl PasswordVerifier for BcryptVerifier {
    async fn verify(&self, candidate: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        let candidate = candidate.to_string();
        let stored_hash = stored_hash.to_string();

        tokio::task::spawn_blocking(move || {
            bcrypt::verify(candidate, &stored_hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))
        })
        .await
        .map_err(|e| PasswordError::Task(e.to_string()))?
    }
}

/// Hash a password with bcrypt for seeding a credential store.
///
/// The authentication core itself never writes hashes; this exists for
/// fixtures and provisioning scripts.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    let password = password.to_string();

    tokio::task::spawn_blocking(move || {
        bcrypt::hash(password, cost).map_err(|e| PasswordError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| PasswordError::Task(e.to_string()))?
}
