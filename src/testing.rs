//! Authentication Testing Utilities
//!
//! Generators and assertions for exercising the login handler and request
//! authenticator from unit and router-level tests.
//!
//! # What This Module Provides
//!
//! - Token mutators ([`tamper_signature`]) and garbage inputs ([`malformed_tokens`])
//! - `Authorization` header variants with the expected extraction result
//! - Minting tokens at a chosen issue time ([`issue_token_at`])
//! - [`MessageAssertions`] for `{"message": ...}` failure responses
//!
//! # Usage
//!
//! ```ignore
//! use tollgate::testing::{tamper_signature, MessageAssertions};
//!
//! let forged = tamper_signature(&token, 0);
//! let response = app.oneshot(request_with_bearer(&forged)).await?;
//! let status = response.status();
//! let body = response.into_body().collect().await?.to_bytes();
//!
//! let check = MessageAssertions::parse(status, &body);
//! assert!(check.is_token_rejection());
//! assert!(check.leaks(&["InvalidSignature"]).is_empty());
//! ```

use axum::http::StatusCode;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::error::{
    ErrorResponse, AUTHENTICATION_REQUIRED_MESSAGE, CREDENTIAL_INVALID_MESSAGE,
    TOKEN_REJECTED_MESSAGE,
};
use crate::token::{Claims, TokenCodec, TokenError};

// ============================================================================
// Token Generators
// ============================================================================

/// Flip one bit of the signature byte at `position` (modulo its length).
///
/// The header and payload are left untouched, so the result is a
/// well-formed token whose signature no longer matches. Tokens without a
/// decodable signature segment are returned with a character appended.
pub fn tamper_signature(token: &str, position: usize) -> String {
    let Some((signed, signature)) = token.rsplit_once('.') else {
        return format!("{}x", token);
    };

    match URL_SAFE_NO_PAD.decode(signature) {
        Ok(mut bytes) if !bytes.is_empty() => {
            let index = position % bytes.len();
            bytes[index] ^= 0x01;
            format!("{}.{}", signed, URL_SAFE_NO_PAD.encode(bytes))
        }
        _ => format!("{}x", token),
    }
}

/// Strings that must never decode as a token.
pub fn malformed_tokens() -> Vec<&'static str> {
    vec![
        "",
        ".",
        "..",
        "not-a-token",
        "a.b",
        "a.b.c",
        "a.b.c.d",
        // alg "none" header, empty signature
        "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.eyJlbWFpbCI6ImFAeC5jb20iLCJpYXQiOjB9.",
        // HS256 header, payload without signature
        "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJlbWFpbCI6ImFAeC5jb20iLCJpYXQiOjB9",
        // Valid header, payload is not JSON
        "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.bm90IGpzb24.c2ln",
        "Bearer eyJhbGciOiJIUzI1NiJ9.e30.sig",
        "\u{0}\u{0}\u{0}",
    ]
}

/// `Authorization` header values paired with whether a bearer token of
/// `token` should be extracted from them.
pub fn bearer_header_variants(token: &str) -> Vec<(String, bool)> {
    vec![
        (format!("Bearer {}", token), true),
        (format!("bearer {}", token), true),
        (format!("BEARER {}", token), true),
        (format!("  Bearer   {}  ", token), true),
        ("Bearer".to_string(), false),
        ("Bearer ".to_string(), false),
        (format!("Bearer{}", token), false),
        (format!("Bearer\t{}", token), false),
        (format!("Basic {}", token), false),
        (format!("Token {}", token), false),
        (format!("Bearer {} extra", token), false),
        (token.to_string(), false),
    ]
}

/// Mint a token for `email` with a chosen `iat`, for expiry tests.
pub fn issue_token_at(codec: &dyn TokenCodec, email: &str, iat: i64) -> Result<String, TokenError> {
    codec.encode(&Claims::new(email, email, iat))
}

// ============================================================================
// Response Assertions
// ============================================================================

/// Parsed failure response for checking status and `{"message"}` body.
#[derive(Debug, Clone)]
pub struct MessageAssertions {
    status: StatusCode,
    message: Option<String>,
}

impl MessageAssertions {
    /// Parse a response status and raw body.
    ///
    /// A body that is not `{"message": String}` yields no message.
    pub fn parse(status: StatusCode, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<ErrorResponse>(body)
            .ok()
            .map(|r| r.message);
        Self { status, message }
    }

    /// Response status
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Parsed message, if the body had the expected shape
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// 401 `Authentication Required`
    pub fn is_challenge(&self) -> bool {
        self.is(StatusCode::UNAUTHORIZED, AUTHENTICATION_REQUIRED_MESSAGE)
    }

    /// 403 with the shared rejection message
    pub fn is_token_rejection(&self) -> bool {
        self.is(StatusCode::FORBIDDEN, TOKEN_REJECTED_MESSAGE)
    }

    /// 401 with the login denial message
    pub fn is_login_denial(&self) -> bool {
        self.is(StatusCode::UNAUTHORIZED, CREDENTIAL_INVALID_MESSAGE)
    }

    /// Which of `needles` appear in the message, case-insensitively.
    ///
    /// Use with secrets, codec error names, or store details that must
    /// never reach a client.
    pub fn leaks(&self, needles: &[&str]) -> Vec<String> {
        let Some(message) = &self.message else {
            return Vec::new();
        };
        let message = message.to_lowercase();
        needles
            .iter()
            .filter(|n| !n.is_empty() && message.contains(&n.to_lowercase()))
            .map(|n| n.to_string())
            .collect()
    }

    fn is(&self, status: StatusCode, message: &str) -> bool {
        self.status == status && self.message.as_deref() == Some(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tamper_changes_only_signature() {
        let token = "eyJhbGciOiJIUzI1NiJ9.e30.AAAAAAAAAAAAAAAAAAAAAA";
        for position in 0..40 {
            let tampered = tamper_signature(token, position);
            assert_ne!(tampered, token);
            assert!(tampered.starts_with("eyJhbGciOiJIUzI1NiJ9.e30."));
        }
    }

    #[test]
    fn test_tamper_without_signature() {
        assert_eq!(tamper_signature("abc", 0), "abcx");
        assert_eq!(tamper_signature("a.b.", 3), "a.b.x");
    }

    #[test]
    fn test_malformed_tokens_not_empty() {
        let tokens = malformed_tokens();
        assert!(tokens.len() >= 10);
        assert!(tokens.contains(&""));
    }

    #[test]
    fn test_bearer_variants_cover_both_outcomes() {
        let variants = bearer_header_variants("t");
        assert!(variants.iter().any(|(_, ok)| *ok));
        assert!(variants.iter().any(|(_, ok)| !*ok));
    }

    #[test]
    fn test_message_assertions() {
        let body = br#"{"message":"Authentication Required"}"#;
        let check = MessageAssertions::parse(StatusCode::UNAUTHORIZED, body);
        assert!(check.is_challenge());
        assert!(!check.is_token_rejection());
        assert!(!check.is_login_denial());

        let check = MessageAssertions::parse(StatusCode::FORBIDDEN, body);
        assert!(!check.is_challenge());
    }

    #[test]
    fn test_message_assertions_non_json() {
        let check = MessageAssertions::parse(StatusCode::OK, b"hello");
        assert_eq!(check.message(), None);
        assert!(check.leaks(&["hello"]).is_empty());
    }

    #[test]
    fn test_leaks() {
        let body = br#"{"message":"token decoding failed: InvalidSignature"}"#;
        let check = MessageAssertions::parse(StatusCode::FORBIDDEN, body);
        assert_eq!(check.leaks(&["invalidsignature", "secret", ""]), vec!["invalidsignature"]);
    }
}
