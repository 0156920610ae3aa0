//! Request Authenticator
//!
//! Runs once per inbound request and decides who, if anyone, is calling.
//!
//! # Stages
//!
//! ```text
//! trigger header? ──no──▶ Skipped        (proceed unauthenticated)
//!       │yes
//! Authorization: Bearer <t>? ──no──▶ NoCredentials (proceed unauthenticated)
//!       │yes
//! decode + verify signature ──fail──▶ Rejected(DecodeFailed)
//!       │
//! now > iat + ttl ──yes──▶ Rejected(Expired)
//!       │
//! email claim → user store ──none──▶ Rejected(MissingClaim | UserNotFound)
//!       │
//! Authenticated(user)
//! ```
//!
//! A resolved user is accepted as-is: the password is not re-checked, the
//! token signature is the proof. Unauthenticated requests are not rejected
//! here; [`require_authentication`] or the [`AuthenticatedUser`] extractor
//! issues the 401 challenge on routes that need an identity.
//!
//! # Usage
//!
//! ```ignore
//! use axum::{middleware, routing::get, Router};
//! use tollgate::authenticator::{authentication_middleware, AuthenticatedUser, RequestAuthenticator};
//!
//! async fn me(AuthenticatedUser(user): AuthenticatedUser) -> String {
//!     user.email
//! }
//!
//! let authenticator = Arc::new(RequestAuthenticator::new(&config, users, codec));
//! let app = Router::new()
//!     .route("/me", get(me))
//!     .layer(middleware::from_fn_with_state(authenticator, authentication_middleware));
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::config::AuthConfig;
use crate::error::{AuthError, Rejection};
use crate::observability::SecurityEvent;
use crate::token::{Claims, TokenCodec};
use crate::user::{UserIdentity, UserLookup};

/// Authorization scheme accepted in the `Authorization` header.
pub const BEARER_SCHEME: &str = "Bearer";

/// Result of evaluating one request.
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    /// No trigger header: the authenticator does not apply
    Skipped,
    /// Trigger header present but no usable bearer token
    NoCredentials,
    /// Token verified and user resolved
    Authenticated(UserIdentity),
    /// Token present but did not resolve to a user
    Rejected(Rejection),
}

impl AuthOutcome {
    /// The resolved user, if any
    pub fn user(&self) -> Option<&UserIdentity> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

// ============================================================================
// Request Authenticator
// ============================================================================

/// Stateless per-request token authenticator.
///
/// Holds only immutable configuration and shared collaborators, so one
/// instance behind an `Arc` serves every request.
#[derive(Clone)]
pub struct RequestAuthenticator {
    users: Arc<dyn UserLookup>,
    codec: Arc<dyn TokenCodec>,
    ttl_secs: i64,
    trigger_header: String,
}

impl RequestAuthenticator {
    /// Create an authenticator using the TTL and trigger header from `config`.
    pub fn new(config: &AuthConfig, users: Arc<dyn UserLookup>, codec: Arc<dyn TokenCodec>) -> Self {
        Self {
            users,
            codec,
            ttl_secs: config.ttl_secs(),
            trigger_header: config.trigger_header.clone(),
        }
    }

    /// Token lifetime in seconds
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Stage 1: does this request ask to be authenticated?
    pub fn supports(&self, headers: &HeaderMap) -> bool {
        headers.contains_key(self.trigger_header.as_str())
    }

    /// Stage 2: pull the token out of `Authorization: Bearer <token>`.
    ///
    /// The scheme is matched case-insensitively. A missing header, another
    /// scheme, an empty token, or extra words all yield `None`.
    pub fn extract_credentials(headers: &HeaderMap) -> Option<String> {
        let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
        let (scheme, token) = value.split_once(' ')?;
        let token = token.trim();

        if !scheme.eq_ignore_ascii_case(BEARER_SCHEME)
            || token.is_empty()
            || token.contains(char::is_whitespace)
        {
            return None;
        }
        Some(token.to_string())
    }

    /// Stage 4: whether `claims` are past the configured lifetime at `now`.
    pub fn is_expired(&self, claims: &Claims, now: i64) -> bool {
        claims.is_expired_at(now, self.ttl_secs)
    }

    /// Stages 3-5: decode, check expiry, and resolve the user.
    ///
    /// Protocol failures come back as [`AuthError::TokenRejected`]; a failing
    /// user store comes back as [`AuthError::Lookup`].
    pub async fn resolve_user_at(&self, token: &str, now: i64) -> Result<UserIdentity, AuthError> {
        let claims = self
            .codec
            .decode(token)
            .map_err(|e| AuthError::TokenRejected(Rejection::DecodeFailed(e)))?;

        if self.is_expired(&claims, now) {
            let overdue_secs = now.saturating_sub(claims.iat.saturating_add(self.ttl_secs));
            return Err(AuthError::TokenRejected(Rejection::Expired { overdue_secs }));
        }

        let email = claims
            .lookup_email()
            .ok_or(AuthError::TokenRejected(Rejection::MissingClaim))?;

        self.users
            .find_one_by_email(email)
            .await?
            .ok_or(AuthError::TokenRejected(Rejection::UserNotFound))
    }

    /// Evaluate a request's headers at the current time.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthOutcome, AuthError> {
        self.authenticate_at(headers, Utc::now().timestamp()).await
    }

    /// Evaluate a request's headers at `now` (Unix seconds).
    ///
    /// `Err` is reserved for collaborator failures; every protocol outcome,
    /// including rejection, is an `Ok(AuthOutcome)`.
    pub async fn authenticate_at(&self, headers: &HeaderMap, now: i64) -> Result<AuthOutcome, AuthError> {
        if !self.supports(headers) {
            return Ok(AuthOutcome::Skipped);
        }

        let Some(token) = Self::extract_credentials(headers) else {
            tracing::debug!("Trigger header present without bearer credentials");
            return Ok(AuthOutcome::NoCredentials);
        };

        match self.resolve_user_at(&token, now).await {
            Ok(user) => {
                crate::security_event!(
                    SecurityEvent::AccessGranted,
                    user_id = %user.id,
                    "Bearer token accepted"
                );
                Ok(AuthOutcome::Authenticated(user))
            }
            Err(AuthError::TokenRejected(rejection)) => {
                crate::security_event!(
                    SecurityEvent::TokenRejected,
                    reason = rejection.reason(),
                    detail = %rejection,
                    "Bearer token rejected"
                );
                Ok(AuthOutcome::Rejected(rejection))
            }
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for RequestAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestAuthenticator")
            .field("ttl_secs", &self.ttl_secs)
            .field("trigger_header", &self.trigger_header)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Request context
// ============================================================================

/// Identity attached to a request by [`authentication_middleware`].
///
/// As an extractor it doubles as a guard: handlers that take it answer
/// 401 `Authentication Required` when no identity is attached.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserIdentity);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthenticatedUser>() {
            Some(user) => Ok(user.clone()),
            None => {
                challenge(parts.uri.path());
                Err(AuthError::AuthenticationRequired)
            }
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Run the authenticator and attach the identity on success.
///
/// - `Authenticated` → [`AuthenticatedUser`] inserted into extensions
/// - `Skipped` / `NoCredentials` → passed through untouched
/// - `Rejected` → 403 `{"message": ...}`
/// - user store failure → 500
///
/// Use with `axum::middleware::from_fn_with_state`.
pub async fn authentication_middleware(
    State(authenticator): State<Arc<RequestAuthenticator>>,
    mut request: Request,
    next: Next,
) -> Response {
    let outcome = authenticator.authenticate(request.headers()).await;
    match outcome {
        Ok(AuthOutcome::Authenticated(user)) => {
            request.extensions_mut().insert(AuthenticatedUser(user));
            next.run(request).await
        }
        Ok(AuthOutcome::Skipped | AuthOutcome::NoCredentials) => next.run(request).await,
        Ok(AuthOutcome::Rejected(rejection)) => AuthError::TokenRejected(rejection).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Answer 401 `Authentication Required` unless an identity is attached.
///
/// Must run inside [`authentication_middleware`]; use as a `route_layer`
/// on protected routes.
pub async fn require_authentication(request: Request, next: Next) -> Response {
    if request.extensions().get::<AuthenticatedUser>().is_none() {
        challenge(request.uri().path());
        return AuthError::AuthenticationRequired.into_response();
    }
    next.run(request).await
}

fn challenge(path: &str) {
    crate::security_event!(
        SecurityEvent::AuthenticationChallenge,
        path = %path,
        "Authentication required"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret::SigningSecret;
    use crate::testing::{bearer_header_variants, issue_token_at, tamper_signature};
    use crate::token::JwtCodec;
    use crate::user::{InMemoryUserStore, LookupError};
    use async_trait::async_trait;
    use axum::http::HeaderValue;

    const SECRET: &str = "Qm7#Lp2!Vx9@Rt4$Kw8%Zn3^Hy6&Bc5*";
    const TTL: u64 = 3600;
    const NOW: i64 = 1_700_000_000;

    struct FailingStore;

    #[async_trait]
    impl UserLookup for FailingStore {
        async fn find_one_by_email(&self, _email: &str) -> Result<Option<UserIdentity>, LookupError> {
            Err(LookupError("timeout".into()))
        }
    }

    fn codec() -> Arc<JwtCodec> {
        Arc::new(JwtCodec::new(&SigningSecret::new(SECRET)))
    }

    fn config() -> AuthConfig {
        AuthConfig::builder()
            .token_ttl_secs(TTL)
            .signing_secret(SigningSecret::new(SECRET))
            .build()
    }

    fn authenticator() -> RequestAuthenticator {
        let store = InMemoryUserStore::new();
        store.insert(UserIdentity::new("1", "a@x.com", "h"));
        RequestAuthenticator::new(&config(), Arc::new(store), codec())
    }

    fn headers(trigger: bool, authorization: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if trigger {
            headers.insert("x-auth-token", HeaderValue::from_static("1"));
        }
        if let Some(value) = authorization {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    fn token_for(email: &str, iat: i64) -> String {
        issue_token_at(codec().as_ref(), email, iat).unwrap()
    }

    #[test]
    fn test_supports_is_case_insensitive() {
        let auth = authenticator();
        let mut headers = HeaderMap::new();
        assert!(!auth.supports(&headers));
        headers.insert("X-Auth-Token", HeaderValue::from_static(""));
        assert!(auth.supports(&headers));
    }

    #[test]
    fn test_extract_credentials() {
        let token = "aaa.bbb.ccc";
        for (value, accepted) in bearer_header_variants(token) {
            let got = RequestAuthenticator::extract_credentials(&headers(false, Some(&value)));
            assert_eq!(got.as_deref(), accepted.then_some(token), "header {:?}", value);
        }
        assert_eq!(RequestAuthenticator::extract_credentials(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn test_skipped_without_trigger() {
        let auth = authenticator();
        let bearer = format!("Bearer {}", token_for("a@x.com", NOW));
        let outcome = auth.authenticate_at(&headers(false, Some(&bearer)), NOW).await.unwrap();
        assert!(matches!(outcome, AuthOutcome::Skipped));
    }

    #[tokio::test]
    async fn test_no_credentials() {
        let auth = authenticator();
        let outcome = auth.authenticate_at(&headers(true, None), NOW).await.unwrap();
        assert!(matches!(outcome, AuthOutcome::NoCredentials));

        let outcome = auth
            .authenticate_at(&headers(true, Some("Basic dXNlcjpwYXNz")), NOW)
            .await
            .unwrap();
        assert!(matches!(outcome, AuthOutcome::NoCredentials));
    }

    #[tokio::test]
    async fn test_authenticated() {
        let auth = authenticator();
        let bearer = format!("Bearer {}", token_for("a@x.com", NOW));
        let outcome = auth.authenticate_at(&headers(true, Some(&bearer)), NOW).await.unwrap();
        assert_eq!(outcome.user().unwrap().id, "1");
    }

    #[tokio::test]
    async fn test_expiry_boundaries() {
        let auth = authenticator();
        let token = token_for("a@x.com", NOW);
        let ttl = TTL as i64;

        assert!(auth.resolve_user_at(&token, NOW).await.is_ok());
        assert!(auth.resolve_user_at(&token, NOW + ttl).await.is_ok());

        let err = auth.resolve_user_at(&token, NOW + ttl + 1).await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::TokenRejected(Rejection::Expired { overdue_secs: 1 })
        ));

        let bearer = format!("Bearer {}", token);
        let outcome = auth
            .authenticate_at(&headers(true, Some(&bearer)), NOW + ttl + 1)
            .await
            .unwrap();
        assert!(outcome.user().is_none());
        assert!(matches!(outcome, AuthOutcome::Rejected(Rejection::Expired { .. })));
    }

    #[tokio::test]
    async fn test_far_past_iat_is_expired() {
        let auth = authenticator();
        let token = token_for("a@x.com", i64::MIN);
        let bearer = format!("Bearer {}", token);

        let outcome = auth.authenticate_at(&headers(true, Some(&bearer)), NOW).await.unwrap();
        assert!(matches!(outcome, AuthOutcome::Rejected(Rejection::Expired { .. })));

        let err = auth.resolve_user_at(&token, i64::MAX).await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::TokenRejected(Rejection::Expired { overdue_secs: i64::MAX })
        ));
    }

    #[tokio::test]
    async fn test_tampered_token_rejected() {
        let auth = authenticator();
        let token = tamper_signature(&token_for("a@x.com", NOW), 5);
        let err = auth.resolve_user_at(&token, NOW).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenRejected(Rejection::DecodeFailed(_))));
    }

    #[tokio::test]
    async fn test_unknown_user_rejected() {
        let auth = authenticator();
        let token = token_for("ghost@x.com", NOW);
        let err = auth.resolve_user_at(&token, NOW).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenRejected(Rejection::UserNotFound)));
    }

    #[tokio::test]
    async fn test_token_without_identity_rejected() {
        let auth = authenticator();
        let token = codec().encode(&Claims::new("", "", NOW)).unwrap();
        let err = auth.resolve_user_at(&token, NOW).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenRejected(Rejection::MissingClaim)));
    }

    #[tokio::test]
    async fn test_username_only_token_resolves() {
        let auth = authenticator();
        let token = codec().encode(&Claims::new("a@x.com", "", NOW)).unwrap();
        assert_eq!(auth.resolve_user_at(&token, NOW).await.unwrap().email, "a@x.com");
    }

    #[tokio::test]
    async fn test_lookup_failure_is_error_not_rejection() {
        let auth = RequestAuthenticator::new(&config(), Arc::new(FailingStore), codec());
        let bearer = format!("Bearer {}", token_for("a@x.com", NOW));
        let err = auth
            .authenticate_at(&headers(true, Some(&bearer)), NOW)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Lookup(_)));
    }

    #[tokio::test]
    async fn test_custom_trigger_header() {
        let config = AuthConfig::builder()
            .signing_secret(SigningSecret::new(SECRET))
            .trigger_header("X-Api-Auth")
            .build();
        let auth = RequestAuthenticator::new(&config, Arc::new(InMemoryUserStore::new()), codec());

        let outcome = auth.authenticate_at(&headers(true, None), NOW).await.unwrap();
        assert!(matches!(outcome, AuthOutcome::Skipped));

        let mut custom = HeaderMap::new();
        custom.insert("x-api-auth", HeaderValue::from_static("1"));
        let outcome = auth.authenticate_at(&custom, NOW).await.unwrap();
        assert!(matches!(outcome, AuthOutcome::NoCredentials));
    }
}
