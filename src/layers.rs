//! Authentication layer application for Axum routers
//!
//! [`AuthServices`] wires the login handler and request authenticator from
//! one [`AuthConfig`]; [`AuthenticatedRouter`] applies them to a router.
//!
//! # Example
//!
//! ```ignore
//! use axum::{routing::get, Router};
//! use tollgate::{AuthConfig, AuthServices, AuthenticatedRouter, AuthenticatedUser, BcryptVerifier};
//!
//! async fn me(AuthenticatedUser(user): AuthenticatedUser) -> String {
//!     user.email
//! }
//!
//! let config = AuthConfig::from_env()?;
//! let services = AuthServices::new(&config, users, Arc::new(BcryptVerifier));
//!
//! let app = Router::new()
//!     .route("/me", get(me))
//!     .require_authentication()
//!     .merge(services.login_routes())
//!     .with_authentication(services.authenticator());
//! ```

use std::sync::Arc;

use axum::middleware;
use axum::routing::post;
use axum::Router;

use crate::authenticator::{authentication_middleware, require_authentication, RequestAuthenticator};
use crate::config::AuthConfig;
use crate::login::{login_handler, LoginHandler};
use crate::observability::SecurityEvent;
use crate::password::PasswordVerifier;
use crate::token::{JwtCodec, TokenCodec};
use crate::user::UserLookup;

/// Extension trait for applying authentication to an Axum Router.
pub trait AuthenticatedRouter {
    /// Run the request authenticator on every request.
    ///
    /// Resolved identities are attached as
    /// [`AuthenticatedUser`](crate::authenticator::AuthenticatedUser);
    /// rejected tokens are answered with 403 before reaching any handler.
    /// Apply last so it wraps every route, including merged ones.
    fn with_authentication(self, authenticator: Arc<RequestAuthenticator>) -> Self;

    /// Answer 401 `Authentication Required` on the routes added so far
    /// unless the request carries an identity.
    ///
    /// Only affects routes already on the router (it is a route layer).
    fn require_authentication(self) -> Self;
}

impl<S> AuthenticatedRouter for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_authentication(self, authenticator: Arc<RequestAuthenticator>) -> Self {
        self.layer(middleware::from_fn_with_state(
            authenticator,
            authentication_middleware,
        ))
    }

    fn require_authentication(self) -> Self {
        self.route_layer(middleware::from_fn(require_authentication))
    }
}

/// Login handler and request authenticator sharing one codec and user store.
#[derive(Clone)]
pub struct AuthServices {
    login: Arc<LoginHandler>,
    authenticator: Arc<RequestAuthenticator>,
    codec: Arc<dyn TokenCodec>,
    login_path: String,
}

impl AuthServices {
    /// Build both services from configuration.
    pub fn new(
        config: &AuthConfig,
        users: Arc<dyn UserLookup>,
        verifier: Arc<dyn PasswordVerifier>,
    ) -> Self {
        let codec: Arc<dyn TokenCodec> = Arc::new(JwtCodec::new(&config.signing_secret));

        crate::security_event!(
            SecurityEvent::ConfigurationLoaded,
            environment = %config.environment,
            token_ttl_secs = config.ttl_secs(),
            trigger_header = %config.trigger_header,
            login_path = %config.login_path,
            "Authentication configured"
        );

        Self {
            login: Arc::new(LoginHandler::new(users.clone(), verifier, codec.clone())),
            authenticator: Arc::new(RequestAuthenticator::new(config, users, codec.clone())),
            codec,
            login_path: config.login_path.clone(),
        }
    }

    /// Shared login handler
    pub fn login_handler(&self) -> Arc<LoginHandler> {
        self.login.clone()
    }

    /// Shared request authenticator
    pub fn authenticator(&self) -> Arc<RequestAuthenticator> {
        self.authenticator.clone()
    }

    /// Codec used for both issuing and verifying
    pub fn codec(&self) -> Arc<dyn TokenCodec> {
        self.codec.clone()
    }

    /// Configured login path
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// `POST <login_path>` → [`login_handler`], ready to merge.
    pub fn login_routes<S>(&self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        Router::new()
            .route(&self.login_path, post(login_handler))
            .with_state(self.login.clone())
    }
}

impl std::fmt::Debug for AuthServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthServices")
            .field("authenticator", &self.authenticator)
            .field("login_path", &self.login_path)
            .finish_non_exhaustive()
    }
}
