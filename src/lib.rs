//! # Tollgate
//!
//! Stateless bearer-token authentication for Axum applications.
//!
//! Two pieces cooperate through a shared signing secret and user store:
//!
//! - **Login Handler**: `POST /authentication` with form fields `email` and
//!   `password`; answers `{"token": "..."}` or 401.
//! - **Request Authenticator**: for requests carrying the `X-AUTH-TOKEN`
//!   trigger header, reads `Authorization: Bearer <token>`, verifies the
//!   signature, checks `now <= iat + ttl` and resolves the user by email.
//!   No server-side session is kept.
//!
//! ## Features
//!
//! - **HS256 tokens** with `{username, email, iat}` claims
//! - **bcrypt** password verification off the async workers
//! - **Uniform failures**: one 403 body for every rejected token, one 401
//!   challenge for missing credentials
//! - **Structured security events** through `tracing`
//! - **Secret policy** by environment (length, entropy, weak patterns)
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use tollgate::{AuthConfig, AuthServices, AuthenticatedRouter, AuthenticatedUser, BcryptVerifier};
//! use tollgate::observability::{ObservabilityConfig, init};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init(ObservabilityConfig::from_env())?;
//!
//!     let config = AuthConfig::from_env()?;
//!     let services = AuthServices::new(&config, users, Arc::new(BcryptVerifier));
//!
//!     let app = Router::new()
//!         .route("/me", get(|AuthenticatedUser(user): AuthenticatedUser| async move { user.email }))
//!         .require_authentication()
//!         .merge(services.login_routes())
//!         .with_authentication(services.authenticator());
//!
//!     // Serve...
//!     Ok(())
//! }
//! ```

pub mod authenticator;
mod config;
pub mod error;
mod layers;
pub mod login;
pub mod observability;
mod parse;
pub mod password;
pub mod prelude;
pub mod secret;
pub mod testing;
pub mod token;
pub mod user;

// Re-exports
pub use authenticator::{
    authentication_middleware, require_authentication, AuthOutcome, AuthenticatedUser,
    RequestAuthenticator,
};
pub use config::{
    AuthConfig, AuthConfigBuilder, ConfigError, DEFAULT_LOGIN_PATH, DEFAULT_TOKEN_TTL,
    DEFAULT_TRIGGER_HEADER,
};
pub use error::{AuthError, ErrorResponse, Rejection};
pub use layers::{AuthServices, AuthenticatedRouter};
pub use login::{login_handler, LoginHandler, LoginRequest, TokenResponse};
pub use observability::ObservabilityConfigBuilder;
pub use parse::parse_ttl;
pub use password::{BcryptVerifier, PasswordVerifier};
pub use secret::{SecretPolicy, SigningSecret};
pub use token::{Claims, JwtCodec, TokenCodec};
pub use user::{InMemoryUserStore, UserIdentity, UserLookup};
