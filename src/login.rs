//! Login Handler
//!
//! Exchanges an email and password for a signed token.
//!
//! # Flow
//!
//! 1. Both fields must be present and non-empty. The body may be
//!    `application/x-www-form-urlencoded` or `application/json`.
//! 2. Look up exactly one user by email.
//! 3. Reject unless the user exists **and** the password verifies.
//! 4. Sign `{username, email, iat: now}` and return `{"token": "..."}`.
//!
//! Unknown users and wrong passwords produce the same 401 so responses don't
//! reveal which emails are registered. No lockout or rate limiting happens
//! here; put that in front of the route if you need it.
//!
//! # Usage
//!
//! ```ignore
//! use axum::{routing::post, Router};
//! use tollgate::login::{login_handler, LoginHandler};
//!
//! let handler = Arc::new(LoginHandler::new(users, Arc::new(BcryptVerifier), codec));
//! let app = Router::new()
//!     .route("/authentication", post(login_handler))
//!     .with_state(handler);
//! ```

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use axum::{
    extract::{FromRequest, Request, State},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::observability::SecurityEvent;
use crate::password::PasswordVerifier;
use crate::token::{Claims, TokenCodec};
use crate::user::{UserIdentity, UserLookup};

// ============================================================================
// Wire types
// ============================================================================

/// Login body: `email=...&password=...` or `{"email": ..., "password": ...}`
///
/// Missing fields deserialize as empty and are rejected as invalid
/// credentials rather than as a malformed request. As an extractor it never
/// fails: an unreadable body becomes an empty request, which the handler
/// denies with the usual 401.
#[derive(Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    /// Create a login request
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl<S> FromRequest<S> for LoginRequest
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let parsed = if is_json(&req) {
            Json::<LoginRequest>::from_request(req, state)
                .await
                .map(|Json(body)| body)
                .map_err(|e| e.body_text())
        } else {
            Form::<LoginRequest>::from_request(req, state)
                .await
                .map(|Form(body)| body)
                .map_err(|e| e.body_text())
        };

        Ok(parsed.unwrap_or_else(|reason| {
            tracing::debug!(reason = %reason, "Unreadable login body");
            LoginRequest::default()
        }))
    }
}

fn is_json(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// Successful login body: `{"token": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// A freshly signed token and the instant it was issued.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Signed token string
    pub token: String,
    /// `iat` claim, Unix seconds
    pub issued_at: i64,
}

// ============================================================================
// Login Handler
// ============================================================================

/// Verifies credentials and issues tokens.
#[derive(Clone)]
pub struct LoginHandler {
    users: Arc<dyn UserLookup>,
    verifier: Arc<dyn PasswordVerifier>,
    codec: Arc<dyn TokenCodec>,
}

impl LoginHandler {
    /// Create a handler over the given collaborators.
    pub fn new(
        users: Arc<dyn UserLookup>,
        verifier: Arc<dyn PasswordVerifier>,
        codec: Arc<dyn TokenCodec>,
    ) -> Self {
        Self {
            users,
            verifier,
            codec,
        }
    }

    /// Authenticate and issue a token stamped with the current time.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<IssuedToken, AuthError> {
        self.authenticate_at(email, password, Utc::now().timestamp()).await
    }

    /// Authenticate and issue a token stamped with `now` (Unix seconds).
    pub async fn authenticate_at(
        &self,
        email: &str,
        password: &str,
        now: i64,
    ) -> Result<IssuedToken, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            deny(email, "missing_field");
            return Err(AuthError::CredentialInvalid);
        }

        let user = match self.users.find_one_by_email(email).await? {
            Some(user) => user,
            None => {
                deny(email, "unknown_user");
                return Err(AuthError::CredentialInvalid);
            }
        };

        if !self.password_matches(password, &user).await {
            deny(email, "bad_password");
            return Err(AuthError::CredentialInvalid);
        }

        crate::security_event!(
            SecurityEvent::AuthenticationSuccess,
            user_id = %user.id,
            email = %user.email,
            "Login credentials verified"
        );

        let claims = Claims::new(user.username.as_str(), user.email.as_str(), now);
        let token = self.codec.encode(&claims).map_err(AuthError::Signing)?;

        crate::security_event!(
            SecurityEvent::TokenIssued,
            user_id = %user.id,
            issued_at = now,
            "Token issued"
        );

        Ok(IssuedToken {
            token,
            issued_at: now,
        })
    }

    /// A verifier error (corrupt stored hash) counts as a mismatch.
    async fn password_matches(&self, password: &str, user: &UserIdentity) -> bool {
        match self.verifier.verify(password, &user.password_hash).await {
            Ok(matched) => matched,
            Err(e) => {
                tracing::error!(user_id = %user.id, error = %e, "Password verification failed");
                false
            }
        }
    }
}

fn deny(email: &str, reason: &'static str) {
    crate::security_event!(
        SecurityEvent::AuthenticationFailure,
        email = %email,
        reason = reason,
        "Login rejected"
    );
}

/// `POST` handler: `email`, `password` (form or JSON) → `{"token": "..."}`.
pub async fn login_handler(
    State(handler): State<Arc<LoginHandler>>,
    request: LoginRequest,
) -> Result<Json<TokenResponse>, AuthError> {
    let issued = handler.authenticate(&request.email, &request.password).await?;
    Ok(Json(TokenResponse { token: issued.token }))
}
