//! User lookup
//!
//! The authentication core only ever reads users, and only by email. Storage
//! is someone else's problem: implement [`UserLookup`] over your database and
//! pass it in at construction.
//!
//! [`InMemoryUserStore`] is provided for tests and single-process demos.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;

/// A stored user, as seen by the authentication core.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct UserIdentity {
    /// Stable unique identifier
    pub id: String,
    /// Login email, unique per user
    pub email: String,
    /// Display/username claim; defaults to the email
    pub username: String,
    /// Stored credential hash, never serialized
    #[serde(skip)]
    pub password_hash: String,
}

impl UserIdentity {
    /// Create a user whose username is its email.
    pub fn new(id: impl Into<String>, email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let email = email.into();
        Self {
            id: id.into(),
            username: email.clone(),
            email,
            password_hash: password_hash.into(),
        }
    }

    /// Builder: set a username distinct from the email
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }
}

impl fmt::Debug for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserIdentity")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// User store failure. The store's own error is kept as text for logging.
#[derive(Debug, Clone, Error)]
#[error("user lookup failed: {0}")]
pub struct LookupError(pub String);

/// Read-only user lookup.
///
/// Implementations must return at most one user per email and be safe to
/// call concurrently from many requests.
#[async_trait]
pub trait UserLookup: Send + Sync {
    /// Find the user with exactly this email.
    async fn find_one_by_email(&self, email: &str) -> Result<Option<UserIdentity>, LookupError>;
}

/// In-memory user store keyed by email.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, UserIdentity>>,
}

impl InMemoryUserStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user
    pub fn insert(&self, user: UserIdentity) {
        self.users.write().insert(user.email.clone(), user);
    }

    /// Remove a user by email, returning it if present
    pub fn remove(&self, email: &str) -> Option<UserIdentity> {
        self.users.write().remove(email)
    }

    /// Number of stored users
    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

impl FromIterator<UserIdentity> for InMemoryUserStore {
    fn from_iter<I: IntoIterator<Item = UserIdentity>>(iter: I) -> Self {
        let store = Self::new();
        for user in iter {
            store.insert(user);
        }
        store
    }
}

#[async_trait]
impl UserLookup for InMemoryUserStore {
    async fn find_one_by_email(&self, email: &str) -> Result<Option<UserIdentity>, LookupError> {
        Ok(self.users.read().get(email).cloned())
    }
}
