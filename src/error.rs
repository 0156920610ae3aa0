//! Authentication Errors
//!
//! Every failure the core can produce, and how each one reaches the client.
//!
//! # Client-visible shapes
//!
//! There are exactly two authentication outcomes a client can observe on a
//! protected request, plus the login denial:
//!
//! | Error | Status | Body |
//! |-------|--------|------|
//! | [`AuthError::CredentialInvalid`] | 401 | denial message |
//! | [`AuthError::AuthenticationRequired`] | 401 | `Authentication Required` |
//! | [`AuthError::TokenRejected`] | 403 | one message for every [`Rejection`] |
//! | [`AuthError::Signing`], [`AuthError::Lookup`] | 500 | generic message |
//!
//! The [`Rejection`] tag distinguishes an expired token from a forged one or
//! an unknown user. It is logged, never sent: the body is always
//! `{"message": "..."}` and never carries codec, store, or secret details.

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::SecurityEvent;
use crate::token::TokenError;
use crate::user::LookupError;

/// Login denial message.
pub const CREDENTIAL_INVALID_MESSAGE: &str =
    "Authentication denied. User does not exist or the password is wrong.";

/// Challenge message for protected resources requested without credentials.
pub const AUTHENTICATION_REQUIRED_MESSAGE: &str = "Authentication Required";

/// Failure message for any rejected bearer token.
pub const TOKEN_REJECTED_MESSAGE: &str = "Invalid or expired authentication token.";

/// Message for collaborator failures.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

// ============================================================================
// Rejection
// ============================================================================

/// Why a presented bearer token did not resolve to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Signature mismatch or unparsable token
    DecodeFailed(TokenError),
    /// `now > iat + ttl`
    Expired {
        /// Seconds past the end of the token's lifetime
        overdue_secs: i64,
    },
    /// Token has neither an email nor a username claim
    MissingClaim,
    /// No user with the token's email
    UserNotFound,
}

impl Rejection {
    /// Short machine-readable tag for logs
    pub fn reason(&self) -> &'static str {
        match self {
            Self::DecodeFailed(_) => "decode_failed",
            Self::Expired { .. } => "expired",
            Self::MissingClaim => "missing_claim",
            Self::UserNotFound => "user_not_found",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DecodeFailed(e) => write!(f, "{}", e),
            Self::Expired { overdue_secs } => write!(f, "token expired {}s ago", overdue_secs),
            Self::MissingClaim => write!(f, "token carries no email claim"),
            Self::UserNotFound => write!(f, "no user for token email"),
        }
    }
}

// ============================================================================
// AuthError
// ============================================================================

/// Authentication error with its HTTP mapping.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Login with unknown user, wrong password, or missing field
    #[error("{}", CREDENTIAL_INVALID_MESSAGE)]
    CredentialInvalid,

    /// Bearer token present but unusable
    #[error("token rejected: {0}")]
    TokenRejected(Rejection),

    /// Protected resource requested with no credentials
    #[error("{}", AUTHENTICATION_REQUIRED_MESSAGE)]
    AuthenticationRequired,

    /// Token signing failed during issuance
    #[error("token signing failed: {0}")]
    Signing(#[source] TokenError),

    /// The user store failed
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl AuthError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::CredentialInvalid | Self::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            Self::TokenRejected(_) => StatusCode::FORBIDDEN,
            Self::Signing(_) | Self::Lookup(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to send to the client
    pub fn client_message(&self) -> &'static str {
        match self {
            Self::CredentialInvalid => CREDENTIAL_INVALID_MESSAGE,
            Self::TokenRejected(_) => TOKEN_REJECTED_MESSAGE,
            Self::AuthenticationRequired => AUTHENTICATION_REQUIRED_MESSAGE,
            Self::Signing(_) | Self::Lookup(_) => INTERNAL_ERROR_MESSAGE,
        }
    }

    /// Log server-side failures. Authentication outcomes are logged as
    /// security events where they are decided, with more context.
    fn log(&self) {
        if let Self::Signing(_) | Self::Lookup(_) = self {
            crate::security_event!(
                SecurityEvent::ServiceFailure,
                error = %self,
                "Authentication collaborator failed"
            );
        }
    }
}

// ============================================================================
// Error Response
// ============================================================================

/// JSON error body: `{"message": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub message: String,
}

impl ErrorResponse {
    /// Create a response body
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        let body = ErrorResponse::new(self.client_message());
        (self.status_code(), Json(body)).into_response()
    }
}

/// Result type alias for handlers returning AuthError
pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(err: AuthError) -> (StatusCode, ErrorResponse) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::CredentialInvalid.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::AuthenticationRequired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::TokenRejected(Rejection::UserNotFound).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::Signing(TokenError::Encode("x".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AuthError::Lookup(LookupError("db down".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_rejections_share_one_body() {
        let rejections = [
            Rejection::DecodeFailed(TokenError::Decode("InvalidSignature".into())),
            Rejection::Expired { overdue_secs: 5 },
            Rejection::MissingClaim,
            Rejection::UserNotFound,
        ];

        for rejection in rejections {
            let (status, body) = body_of(AuthError::TokenRejected(rejection)).await;
            assert_eq!(status, StatusCode::FORBIDDEN);
            assert_eq!(body.message, TOKEN_REJECTED_MESSAGE);
        }
    }

    #[tokio::test]
    async fn test_internal_details_not_exposed() {
        let (status, body) = body_of(AuthError::Lookup(LookupError(
            "connection refused to 10.0.0.5:5432".into(),
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, INTERNAL_ERROR_MESSAGE);

        let (_, body) = body_of(AuthError::Signing(TokenError::Encode("bad key".into()))).await;
        assert!(!body.message.contains("bad key"));
    }

    #[tokio::test]
    async fn test_challenge_body() {
        let (status, body) = body_of(AuthError::AuthenticationRequired).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.message, "Authentication Required");
    }

    #[test]
    fn test_rejection_reasons() {
        assert_eq!(Rejection::Expired { overdue_secs: 1 }.reason(), "expired");
        assert_eq!(Rejection::UserNotFound.reason(), "user_not_found");
        assert_eq!(
            Rejection::Expired { overdue_secs: 7 }.to_string(),
            "token expired 7s ago"
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(AuthError::CredentialInvalid.to_string(), CREDENTIAL_INVALID_MESSAGE);
        assert_eq!(
            AuthError::TokenRejected(Rejection::UserNotFound).to_string(),
            "token rejected: no user for token email"
        );
    }
}
