//! Authentication configuration
//!
//! Immutable settings shared by the login handler and the request
//! authenticator. Loaded once at startup and passed explicitly into both.

use std::time::Duration;

use thiserror::Error;

use crate::parse::parse_ttl;
use crate::secret::{SecretError, SecretPolicy, SigningSecret};

/// Header whose presence marks a request as wanting authentication.
pub const DEFAULT_TRIGGER_HEADER: &str = "X-AUTH-TOKEN";

/// Default path for the login endpoint.
pub const DEFAULT_LOGIN_PATH: &str = "/authentication";

/// Default token lifetime when built programmatically.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set
    #[error("missing required setting {0}")]
    Missing(&'static str),

    /// The TTL could not be parsed or is zero
    #[error("invalid token TTL '{0}' (expected e.g. \"3600\", \"30m\", \"1h\", \"7d\")")]
    InvalidTtl(String),

    /// The login path is not an absolute route path
    #[error("invalid login path '{0}' (must start with '/')")]
    InvalidLoginPath(String),

    /// The signing secret does not meet the environment's policy
    #[error("signing secret rejected: {0}")]
    WeakSecret(#[from] SecretError),
}

/// Authentication configuration.
///
/// # Example
///
/// ```ignore
/// use tollgate::AuthConfig;
///
/// // Load from environment variables
/// let config = AuthConfig::from_env()?;
///
/// // Or build programmatically
/// let config = AuthConfig::builder()
///     .token_ttl(Duration::from_secs(900))
///     .signing_secret(SigningSecret::generate(64))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Maximum token age, counted from the `iat` claim
    pub token_ttl: Duration,

    /// Symmetric key for signing and verifying tokens
    pub signing_secret: SigningSecret,

    /// Header that triggers the authenticator (presence only)
    pub trigger_header: String,

    /// Path the login handler is mounted on
    pub login_path: String,

    /// Deployment environment name, drives the secret policy
    pub environment: String,
}

impl AuthConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `AUTH_TOKEN_TTL`: token lifetime, e.g. "3600", "30m", "1h" (required)
    /// - `AUTH_SIGNING_SECRET`: HMAC signing secret (required)
    /// - `AUTH_TRIGGER_HEADER`: trigger header name (default: "X-AUTH-TOKEN")
    /// - `AUTH_LOGIN_PATH`: login route (default: "/authentication")
    /// - `RUST_ENV` / `APP_ENV`: environment for the secret policy (default: "development")
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key/value source.
    ///
    /// `from_env` delegates here; tests pass a closure over a map instead of
    /// mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("RUST_ENV")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let raw_ttl = lookup("AUTH_TOKEN_TTL").ok_or(ConfigError::Missing("AUTH_TOKEN_TTL"))?;
        let token_ttl = parse_ttl(&raw_ttl).ok_or(ConfigError::InvalidTtl(raw_ttl))?;

        let raw_secret =
            lookup("AUTH_SIGNING_SECRET").ok_or(ConfigError::Missing("AUTH_SIGNING_SECRET"))?;
        let signing_secret =
            SigningSecret::validated(raw_secret, &SecretPolicy::for_environment(&environment))?;

        let trigger_header = lookup("AUTH_TRIGGER_HEADER")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TRIGGER_HEADER.to_string());

        let login_path = match lookup("AUTH_LOGIN_PATH") {
            Some(path) if path.starts_with('/') => path,
            Some(path) => return Err(ConfigError::InvalidLoginPath(path)),
            None => DEFAULT_LOGIN_PATH.to_string(),
        };

        Ok(Self {
            token_ttl,
            signing_secret,
            trigger_header,
            login_path,
            environment,
        })
    }

    /// Create a new builder for programmatic configuration.
    pub fn builder() -> AuthConfigBuilder {
        AuthConfigBuilder::default()
    }

    /// Token TTL in whole seconds, as used by the expiry check.
    pub fn ttl_secs(&self) -> i64 {
        i64::try_from(self.token_ttl.as_secs()).unwrap_or(i64::MAX)
    }

    /// Whether this configuration targets production.
    pub fn is_production(&self) -> bool {
        matches!(self.environment.to_lowercase().as_str(), "production" | "prod")
    }
}

/// Builder for AuthConfig
#[derive(Debug, Clone)]
pub struct AuthConfigBuilder {
    config: AuthConfig,
}

impl Default for AuthConfigBuilder {
    fn default() -> Self {
        Self {
            config: AuthConfig {
                token_ttl: DEFAULT_TOKEN_TTL,
                signing_secret: SigningSecret::generate(64),
                trigger_header: DEFAULT_TRIGGER_HEADER.to_string(),
                login_path: DEFAULT_LOGIN_PATH.to_string(),
                environment: "development".to_string(),
            },
        }
    }
}

impl AuthConfigBuilder {
    /// Set the token time-to-live.
    pub fn token_ttl(mut self, ttl: Duration) -> Self {
        self.config.token_ttl = ttl;
        self
    }

    /// Set the token time-to-live in seconds.
    pub fn token_ttl_secs(mut self, secs: u64) -> Self {
        self.config.token_ttl = Duration::from_secs(secs);
        self
    }

    /// Set the signing secret.
    pub fn signing_secret(mut self, secret: SigningSecret) -> Self {
        self.config.signing_secret = secret;
        self
    }

    /// Set the trigger header name.
    pub fn trigger_header(mut self, header: impl Into<String>) -> Self {
        self.config.trigger_header = header.into();
        self
    }

    /// Set the login route path.
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.config.login_path = path.into();
        self
    }

    /// Set the environment name.
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.config.environment = environment.into();
        self
    }

    /// Build the configuration.
    pub fn build(self) -> AuthConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const GOOD_SECRET: &str = "Qm7#Lp2!Vx9@Rt4$Kw8%Zn3^Hy6&Bc5*";

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = AuthConfig::from_lookup(lookup_from(&[
            ("AUTH_TOKEN_TTL", "1h"),
            ("AUTH_SIGNING_SECRET", GOOD_SECRET),
        ]))
        .unwrap();

        assert_eq!(config.token_ttl, Duration::from_secs(3600));
        assert_eq!(config.ttl_secs(), 3600);
        assert_eq!(config.trigger_header, "X-AUTH-TOKEN");
        assert_eq!(config.login_path, "/authentication");
        assert_eq!(config.environment, "development");
        assert!(!config.is_production());
    }

    #[test]
    fn test_ttl_is_required() {
        let err = AuthConfig::from_lookup(lookup_from(&[("AUTH_SIGNING_SECRET", GOOD_SECRET)]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("AUTH_TOKEN_TTL")));
    }

    #[test]
    fn test_secret_is_required() {
        let err = AuthConfig::from_lookup(lookup_from(&[("AUTH_TOKEN_TTL", "60")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("AUTH_SIGNING_SECRET")));
    }

    #[test]
    fn test_invalid_ttl() {
        let err = AuthConfig::from_lookup(lookup_from(&[
            ("AUTH_TOKEN_TTL", "forever"),
            ("AUTH_SIGNING_SECRET", GOOD_SECRET),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTtl(ref s) if s == "forever"));
    }

    #[test]
    fn test_secret_checked_against_environment_policy() {
        // Long enough for development, too short for production
        let err = AuthConfig::from_lookup(lookup_from(&[
            ("AUTH_TOKEN_TTL", "60"),
            ("AUTH_SIGNING_SECRET", GOOD_SECRET),
            ("RUST_ENV", "production"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::WeakSecret(SecretError::TooShort { minimum: 64, .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let config = AuthConfig::from_lookup(lookup_from(&[
            ("AUTH_TOKEN_TTL", "900"),
            ("AUTH_SIGNING_SECRET", GOOD_SECRET),
            ("AUTH_TRIGGER_HEADER", "X-Api-Auth"),
            ("AUTH_LOGIN_PATH", "/api/login"),
            ("APP_ENV", "staging-ish"),
        ]))
        .unwrap();
        assert_eq!(config.trigger_header, "X-Api-Auth");
        assert_eq!(config.login_path, "/api/login");
        assert_eq!(config.environment, "staging-ish");
    }

    #[test]
    fn test_relative_login_path_rejected() {
        let err = AuthConfig::from_lookup(lookup_from(&[
            ("AUTH_TOKEN_TTL", "60"),
            ("AUTH_SIGNING_SECRET", GOOD_SECRET),
            ("AUTH_LOGIN_PATH", "api/login"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLoginPath(ref p) if p == "api/login"));
    }

    #[test]
    fn test_builder() {
        let config = AuthConfig::builder()
            .token_ttl_secs(30)
            .trigger_header("X-Custom")
            .environment("production")
            .build();
        assert_eq!(config.ttl_secs(), 30);
        assert_eq!(config.trigger_header, "X-Custom");
        assert!(config.is_production());
        assert_eq!(config.signing_secret.len(), 64);
    }
}
