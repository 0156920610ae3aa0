//! Security Event Logging
//!
//! Structured logging for authentication decisions. Every login attempt and
//! every token evaluation emits one event carrying its name, category and
//! severity, so log pipelines can filter on them without parsing messages.
//!
//! # Usage
//!
//! ```ignore
//! use tollgate::observability::{SecurityEvent, security_event};
//!
//! security_event!(
//!     SecurityEvent::TokenRejected,
//!     reason = %rejection,
//!     "Bearer token rejected"
//! );
//! ```
//!
//! Passwords, tokens, hashes and secrets are never logged.

use std::fmt;

/// Security event categories for audit logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityEvent {
    // Login
    /// Credentials verified at the login endpoint
    AuthenticationSuccess,
    /// Login attempt with unknown user or wrong password
    AuthenticationFailure,
    /// Signed token handed to a client
    TokenIssued,

    // Request authentication
    /// Bearer token accepted and identity attached to the request
    AccessGranted,
    /// Bearer token present but rejected (bad signature, expired, unknown user)
    TokenRejected,
    /// Protected resource requested without credentials
    AuthenticationChallenge,

    // System
    /// Authentication configuration loaded
    ConfigurationLoaded,
    /// A collaborator (user store, signer) failed
    ServiceFailure,
}

impl SecurityEvent {
    /// Get the event category for filtering/grouping
    pub fn category(&self) -> &'static str {
        match self {
            Self::AuthenticationSuccess | Self::AuthenticationFailure | Self::TokenIssued => {
                "authentication"
            }

            Self::AccessGranted | Self::TokenRejected | Self::AuthenticationChallenge => {
                "authorization"
            }

            Self::ConfigurationLoaded | Self::ServiceFailure => "system",
        }
    }

    /// Get the severity level for the event
    pub fn severity(&self) -> Severity {
        match self {
            Self::ServiceFailure => Severity::Critical,

            Self::AuthenticationFailure | Self::TokenRejected => Severity::High,

            Self::AuthenticationSuccess | Self::TokenIssued | Self::ConfigurationLoaded => {
                Severity::Medium
            }

            Self::AccessGranted | Self::AuthenticationChallenge => Severity::Low,
        }
    }

    /// Get the event name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Self::AuthenticationSuccess => "authentication_success",
            Self::AuthenticationFailure => "authentication_failure",
            Self::TokenIssued => "token_issued",
            Self::AccessGranted => "access_granted",
            Self::TokenRejected => "token_rejected",
            Self::AuthenticationChallenge => "authentication_challenge",
            Self::ConfigurationLoaded => "configuration_loaded",
            Self::ServiceFailure => "service_failure",
        }
    }
}

impl fmt::Display for SecurityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Event severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Routine operations
    Low,
    /// Important state changes
    Medium,
    /// Security-relevant failures
    High,
    /// Immediate attention required
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Log a security event with structured fields.
///
/// The macro adds `security_event`, `category` and `severity` fields and
/// picks the tracing level from the event's severity:
/// critical → error, high → warn, medium → info, low → debug.
///
/// ```ignore
/// security_event!(
///     SecurityEvent::AuthenticationFailure,
///     email = %email,
///     "Login rejected"
/// );
/// ```
#[macro_export]
macro_rules! security_event {
    ($event:expr, $($field:tt)*) => {{
        let event = $event;
        let category = event.category();
        let event_name = event.name();

        match event.severity() {
            $crate::observability::Severity::Critical => {
                ::tracing::error!(
                    security_event = event_name,
                    category = category,
                    severity = "critical",
                    $($field)*
                );
            }
            $crate::observability::Severity::High => {
                ::tracing::warn!(
                    security_event = event_name,
                    category = category,
                    severity = "high",
                    $($field)*
                );
            }
            $crate::observability::Severity::Medium => {
                ::tracing::info!(
                    security_event = event_name,
                    category = category,
                    severity = "medium",
                    $($field)*
                );
            }
            $crate::observability::Severity::Low => {
                ::tracing::debug!(
                    security_event = event_name,
                    category = category,
                    severity = "low",
                    $($field)*
                );
            }
        }
    }};
}

pub use security_event;
