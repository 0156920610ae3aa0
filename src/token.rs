//! Token Codec
//!
//! Tokens are HS256 JWTs carrying a minimal claim set:
//!
//! ```text
//! { "username": "a@x.com", "email": "a@x.com", "iat": 1718000000 }
//! ```
//!
//! There is no `exp` claim. A token's lifetime is decided by the
//! verifier as `iat + ttl`, so shortening the configured TTL takes effect for
//! tokens that are already out in the wild.
//!
//! The codec sits behind the [`TokenCodec`] trait so issuers sharing the
//! secret (or tests) can plug in their own implementation.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::secret::SigningSecret;

/// Token encode/decode errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Claims could not be serialized or signed
    #[error("token encoding failed: {0}")]
    Encode(String),

    /// Signature mismatch, malformed structure, or unparsable payload
    #[error("token decoding failed: {0}")]
    Decode(String),
}

/// Claim set carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the authenticated user
    #[serde(default)]
    pub username: String,

    /// Email used to resolve the user on later requests
    #[serde(default)]
    pub email: String,

    /// Issued-at, Unix seconds
    pub iat: i64,
}

impl Claims {
    /// Create a claim set issued at `iat`.
    pub fn new(username: impl Into<String>, email: impl Into<String>, iat: i64) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            iat,
        }
    }

    /// The identity used for user lookup.
    ///
    /// Prefers `email`; tokens from issuers that only set `username` fall
    /// back to it. `None` when both are empty.
    pub fn lookup_email(&self) -> Option<&str> {
        [self.email.as_str(), self.username.as_str()]
            .into_iter()
            .map(str::trim)
            .find(|s| !s.is_empty())
    }

    /// Whether the claim set is past its lifetime at `now`.
    ///
    /// Valid while `now <= iat + ttl_secs`.
    pub fn is_expired_at(&self, now: i64, ttl_secs: i64) -> bool {
        now > self.iat.saturating_add(ttl_secs)
    }
}

/// Signs and verifies claim sets.
pub trait TokenCodec: Send + Sync {
    /// Sign `claims` into an opaque token string.
    fn encode(&self, claims: &Claims) -> Result<String, TokenError>;

    /// Verify the signature of `token` and return its claims.
    fn decode(&self, token: &str) -> Result<Claims, TokenError>;
}

/// HS256 JWT codec keyed by the shared signing secret.
pub struct JwtCodec {
    header: Header,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtCodec {
    /// Create a codec from the shared secret.
    pub fn new(secret: &SigningSecret) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Lifetime is iat + ttl, enforced by the authenticator
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            header: Header::new(Algorithm::HS256),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl std::fmt::Debug for JwtCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtCodec")
            .field("algorithm", &self.header.alg)
            .finish_non_exhaustive()
    }
}

impl TokenCodec for JwtCodec {
    fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&self.header, claims, &self.encoding_key).map_err(|e| TokenError::Encode(e.to_string()))
    }

    fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Decode(e.to_string()))
    }
}
