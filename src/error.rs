//! Error handling module with type-safe, non-exhaustive error types
//!
//! This module provides a unified error handling approach with:
//! - Non-exhaustive enums for forward compatibility
//! - Structured error variants with contextual information
//! - Automatic conversion from external error types
//! - Generic public messages that never leak secrets or upstream details

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Sensitive patterns that should be sanitized from error messages
const SENSITIVE_PATTERNS: &[&str] = &[
    "password",
    "secret",
    "token",
    "key",
    "credential",
    "bearer",
    "authorization",
    "http://",
    "https://",
];

/// Fallback timeout reported when the underlying HTTP error does not carry one
const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Non-exhaustive error enum for forward compatibility
/// New variants can be added without breaking existing code
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum GatewayError {
    /// No token was provided on a route that requires one
    #[error("Token missing from request")]
    TokenMissing,

    /// Token structure is malformed (segments, base64url, claims shape)
    #[error("Token malformed: {reason}")]
    TokenMalformed {
        /// Description of the malformation
        reason: String,
    },

    /// Token signature verification failed
    #[error("Token signature invalid")]
    BadSignature,

    /// Token has expired
    #[error("Token expired at {expired_at}")]
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
    },

    /// Login failed; unknown email and wrong password are indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Authenticated caller lacks the capability the route requires
    #[error("Missing capability: {capability}")]
    Forbidden {
        /// Name of the missing capability claim
        capability: &'static str,
    },

    /// No route descriptor matches the requested path segment
    #[error("Unknown route: {route}")]
    UnknownRoute {
        /// The unmatched route segment
        route: String,
    },

    /// Request body is missing, not JSON, or not a JSON object
    #[error("Malformed request: {reason}")]
    MalformedRequest {
        /// Description of the problem
        reason: String,
    },

    /// Login request is missing the email or password field
    #[error("Login request missing email or password")]
    MissingLoginFields,

    /// HTTP method is not accepted on this route
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Upstream service could not be reached
    #[error("Upstream unavailable: {reason}")]
    UpstreamUnavailable {
        /// Description of the transport failure
        reason: String,
    },

    /// Upstream answered with a body that is not JSON
    #[error("Upstream returned a non-JSON body with status {status}")]
    UpstreamMalformed {
        /// HTTP status of the malformed upstream response
        status: u16,
    },

    /// Upstream call timed out
    #[error("Upstream timed out after {duration:?}")]
    Timeout {
        /// How long the call ran before timing out
        duration: Duration,
    },

    /// Internal error (details sanitized in responses)
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Error codes attached to structured log events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    TokenMissing,
    TokenMalformed,
    BadSignature,
    TokenExpired,
    InvalidCredentials,
    Forbidden,
    UnknownRoute,
    MalformedRequest,
    MissingLoginFields,
    MethodNotAllowed,
    UpstreamUnavailable,
    UpstreamMalformed,
    Timeout,
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TokenMissing => "AUTH_TOKEN_MISSING",
            Self::TokenMalformed => "AUTH_TOKEN_MALFORMED",
            Self::BadSignature => "AUTH_BAD_SIGNATURE",
            Self::TokenExpired => "AUTH_TOKEN_EXPIRED",
            Self::InvalidCredentials => "AUTH_INVALID_CREDENTIALS",
            Self::Forbidden => "AUTHZ_FORBIDDEN",
            Self::UnknownRoute => "ROUTE_UNKNOWN",
            Self::MalformedRequest => "REQUEST_MALFORMED",
            Self::MissingLoginFields => "LOGIN_FIELDS_MISSING",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            Self::UpstreamMalformed => "UPSTREAM_MALFORMED",
            Self::Timeout => "UPSTREAM_TIMEOUT",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

impl GatewayError {
    /// Get the error code for this error
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::TokenMissing => ErrorCode::TokenMissing,
            Self::TokenMalformed { .. } => ErrorCode::TokenMalformed,
            Self::BadSignature => ErrorCode::BadSignature,
            Self::TokenExpired { .. } => ErrorCode::TokenExpired,
            Self::InvalidCredentials => ErrorCode::InvalidCredentials,
            Self::Forbidden { .. } => ErrorCode::Forbidden,
            Self::UnknownRoute { .. } => ErrorCode::UnknownRoute,
            Self::MalformedRequest { .. } => ErrorCode::MalformedRequest,
            Self::MissingLoginFields => ErrorCode::MissingLoginFields,
            Self::MethodNotAllowed => ErrorCode::MethodNotAllowed,
            Self::UpstreamUnavailable { .. } => ErrorCode::UpstreamUnavailable,
            Self::UpstreamMalformed { .. } => ErrorCode::UpstreamMalformed,
            Self::Timeout { .. } => ErrorCode::Timeout,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Get the HTTP status this error maps to
    #[must_use]
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::TokenMissing
            | Self::TokenMalformed { .. }
            | Self::BadSignature
            | Self::TokenExpired { .. }
            | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::UnknownRoute { .. } => StatusCode::NOT_FOUND,
            Self::MalformedRequest { .. } | Self::MissingLoginFields => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::UpstreamUnavailable { .. } | Self::UpstreamMalformed { .. } | Self::Timeout { .. } => {
                StatusCode::BAD_GATEWAY
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the public message placed in the response envelope.
    ///
    /// The four token-verification failures share one message so that callers
    /// cannot distinguish an almost-valid token from garbage.
    #[must_use]
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::TokenMissing
            | Self::TokenMalformed { .. }
            | Self::BadSignature
            | Self::TokenExpired { .. } => "Unauthorised",
            Self::InvalidCredentials => "Invalid credentials",
            Self::Forbidden { .. } => "Forbidden",
            Self::UnknownRoute { .. } => "Not Found",
            Self::MalformedRequest { .. } => "Invalid JSON",
            Self::MissingLoginFields => "Email and password are required.",
            Self::MethodNotAllowed => "Method Not Allowed",
            Self::UpstreamUnavailable { .. } | Self::UpstreamMalformed { .. } | Self::Timeout { .. } => {
                "Upstream service unavailable"
            }
            Self::Internal(_) => "Internal error",
        }
    }

    /// Check if this error is retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable { .. } | Self::Timeout { .. })
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = json!({ "ok": false, "error": self.public_message() });
        (self.http_status(), Json(body)).into_response()
    }
}

/// Sanitize a message by removing sensitive information
pub(crate) fn sanitize_message(message: &str) -> String {
    let lower = message.to_lowercase();
    for pattern in SENSITIVE_PATTERNS {
        if lower.contains(pattern) {
            return "upstream request failed".to_string();
        }
    }
    message.to_string()
}

// ============================================================================
// From trait implementations for automatic error conversion
// ============================================================================

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout {
                duration: DEFAULT_UPSTREAM_TIMEOUT,
            }
        } else if err.is_connect() {
            GatewayError::UpstreamUnavailable {
                reason: "connect error".to_string(),
            }
        } else {
            GatewayError::UpstreamUnavailable {
                reason: sanitize_message(&err.to_string()),
            }
        }
    }
}
