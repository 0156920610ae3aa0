//! Signing Secret Management
//!
//! The signing secret is the only key material in the scheme: every token is
//! an HMAC over its claims, so anyone holding the secret can mint identities
//! and rotating it invalidates every outstanding token at once.
//!
//! # Features
//!
//! - [`SigningSecret`] newtype that never prints its contents
//! - Environment-based strength policy (length, entropy, weak patterns)
//! - Character diversity requirements for production
//! - Secure secret generation
//!
//! # Example
//!
//! ```
//! use tollgate::secret::{SecretPolicy, SigningSecret};
//!
//! let policy = SecretPolicy::for_environment("production");
//! let secret = SigningSecret::generate_for(&policy);
//! assert!(secret.len() >= 64);
//! ```

use std::collections::HashMap;
use std::fmt;

use rand::Rng;
use thiserror::Error;

/// Error type for signing secret validation failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SecretError {
    /// Secret is too short for the required environment
    #[error("Secret length ({actual} chars) is below minimum ({minimum} chars) for {context}")]
    TooShort {
        actual: usize,
        minimum: usize,
        context: String,
    },
    /// Secret contains a weak/common pattern
    #[error("Secret contains weak pattern: '{pattern}'")]
    WeakPattern { pattern: String },
    /// Secret has insufficient entropy
    #[error("Secret entropy ({actual:.1} bits) is below minimum ({minimum:.1} bits) for {context}")]
    LowEntropy {
        actual: f64,
        minimum: f64,
        context: String,
    },
    /// Secret lacks required character diversity
    #[error("Secret must contain: {}", missing.join(", "))]
    InsufficientDiversity { missing: Vec<String> },
}

// ============================================================================
// Signing Secret
// ============================================================================

/// Symmetric key used to sign and verify tokens.
///
/// Immutable once constructed. Cloning is cheap enough for startup wiring;
/// at request time the secret lives inside the codec behind an `Arc`.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(String);

impl SigningSecret {
    /// Wrap an existing secret without validating it.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Wrap a secret after checking it against `policy`.
    pub fn validated(secret: impl Into<String>, policy: &SecretPolicy) -> Result<Self, SecretError> {
        let secret = secret.into();
        policy.validate(&secret)?;
        Ok(Self(secret))
    }

    /// Generate a random secret of `length` characters.
    ///
    /// Characters are drawn from A-Z, a-z, 0-9 and punctuation using the
    /// thread-local CSPRNG.
    pub fn generate(length: usize) -> Self {
        const CHARSET: &[u8] =
            b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()_+-=[]{}|;:,.<>?/~";

        let mut rng = rand::thread_rng();
        let secret = (0..length)
            .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
            .collect();
        Self(secret)
    }

    /// Generate a secret that passes `policy`.
    ///
    /// Retries a handful of times, then falls back to a longer secret.
    pub fn generate_for(policy: &SecretPolicy) -> Self {
        let length = policy.min_length.max(64);
        for _ in 0..10 {
            let secret = Self::generate(length);
            if policy.validate(secret.expose()).is_ok() {
                return secret;
            }
        }
        Self::generate(length + 32)
    }

    /// Raw secret material. Only the token codec should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Raw secret bytes, as used for HMAC keys.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Secret length in characters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningSecret([REDACTED; {} chars])", self.0.len())
    }
}

// ============================================================================
// Secret Policy
// ============================================================================

/// Strength requirements for a signing secret.
#[derive(Debug, Clone)]
pub struct SecretPolicy {
    /// Minimum secret length in characters
    pub min_length: usize,
    /// Minimum Shannon entropy in bits
    pub min_entropy: f64,
    /// Whether to require character diversity (upper, lower, digit, special)
    pub require_diversity: bool,
    /// Whether to check for weak patterns
    pub check_weak_patterns: bool,
    /// Context string for error messages
    pub context: String,
}

impl Default for SecretPolicy {
    fn default() -> Self {
        Self::for_environment("development")
    }
}

impl SecretPolicy {
    /// Create a policy for a specific environment.
    ///
    /// # Environments
    ///
    /// - `production`: 64 char min, 128-bit entropy, diversity required
    /// - `staging`: 48 char min, 96-bit entropy, diversity required
    /// - `testing`: 32 char min, 64-bit entropy
    /// - `development` (default): 32 char min, 32-bit entropy
    pub fn for_environment(environment: &str) -> Self {
        let (min_length, min_entropy, require_diversity, context) =
            match environment.to_lowercase().as_str() {
                "production" | "prod" => (64, 128.0, true, "production environment"),
                "staging" | "stage" => (48, 96.0, true, "staging environment"),
                "testing" | "test" => (32, 64.0, false, "testing environment"),
                _ => (32, 32.0, false, "development environment"),
            };

        Self {
            min_length,
            min_entropy,
            require_diversity,
            check_weak_patterns: true,
            context: context.to_string(),
        }
    }

    /// Validate a secret against this policy.
    pub fn validate(&self, secret: &str) -> Result<(), SecretError> {
        if secret.len() < self.min_length {
            return Err(SecretError::TooShort {
                actual: secret.len(),
                minimum: self.min_length,
                context: self.context.clone(),
            });
        }

        if self.check_weak_patterns {
            if let Some(pattern) = find_weak_pattern(secret) {
                return Err(SecretError::WeakPattern {
                    pattern: pattern.to_string(),
                });
            }
        }

        let entropy = shannon_entropy(secret);
        if entropy < self.min_entropy {
            return Err(SecretError::LowEntropy {
                actual: entropy,
                minimum: self.min_entropy,
                context: self.context.clone(),
            });
        }

        if self.require_diversity {
            let missing = missing_character_classes(secret);
            if !missing.is_empty() {
                return Err(SecretError::InsufficientDiversity { missing });
            }
        }

        Ok(())
    }
}

fn find_weak_pattern(secret: &str) -> Option<&'static str> {
    const WEAK_PATTERNS: &[&str] = &[
        "secret", "password", "admin", "123456", "qwerty", "default",
        "example", "changeme", "letmein", "welcome", "jwt", "token",
    ];

    let lower = secret.to_lowercase();
    WEAK_PATTERNS.iter().copied().find(|p| lower.contains(p))
}

fn missing_character_classes(secret: &str) -> Vec<String> {
    let mut missing = Vec::new();

    if !secret.chars().any(|c| c.is_uppercase()) {
        missing.push("uppercase letters".to_string());
    }
    if !secret.chars().any(|c| c.is_lowercase()) {
        missing.push("lowercase letters".to_string());
    }
    if !secret.chars().any(|c| c.is_ascii_digit()) {
        missing.push("digits".to_string());
    }
    if !secret.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()) {
        missing.push("special characters".to_string());
    }

    missing
}

/// Total Shannon entropy of a string in bits (per-char entropy times length).
pub fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut counts: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *counts.entry(c).or_insert(0) += 1;
    }

    let total = s.chars().count() as f64;
    let per_char: f64 = counts
        .values()
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum();

    per_char * total
}
