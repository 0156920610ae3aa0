//! Tollgate Prelude - Common imports for authenticated applications
//!
//! # Usage
//!
//! ```ignore
//! use tollgate::prelude::*;
//!
//! let services = AuthServices::new(&AuthConfig::from_env()?, users, Arc::new(BcryptVerifier));
//! let app = Router::new()
//!     .route("/me", get(handler))
//!     .require_authentication()
//!     .with_authentication(services.authenticator());
//! ```

// =============================================================================
// Configuration
// =============================================================================

pub use crate::config::{AuthConfig, AuthConfigBuilder, ConfigError};
pub use crate::secret::{SecretPolicy, SigningSecret};

// =============================================================================
// Login and Request Authentication
// =============================================================================

pub use crate::authenticator::{AuthOutcome, AuthenticatedUser, RequestAuthenticator};
pub use crate::layers::{AuthServices, AuthenticatedRouter};
pub use crate::login::{LoginHandler, LoginRequest, TokenResponse};

// =============================================================================
// Collaborators
// =============================================================================

pub use crate::password::{BcryptVerifier, PasswordVerifier};
pub use crate::token::{Claims, JwtCodec, TokenCodec};
pub use crate::user::{InMemoryUserStore, LookupError, UserIdentity, UserLookup};

// =============================================================================
// Errors and Observability
// =============================================================================

pub use crate::error::{AuthError, ErrorResponse, Rejection};
pub use crate::observability::{ObservabilityConfig, SecurityEvent};
