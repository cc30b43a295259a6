//! Authorization failures surfaced to the caller.
//!
//! Every variant maps to a fixed `(code, description, status)` row. The table is a
//! plain `match`, so there is nothing to register or mutate at runtime; the only
//! per-request data is the optional `debug` detail.

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("authorization header is missing")]
    HeaderMissing,

    #[error("authorization header does not start with Bearer")]
    HeaderFormatBearer,

    #[error("authorization header has no token")]
    TokenNotFound,

    #[error("authorization header is malformed")]
    HeaderFormat,

    #[error("unable to parse authentication token")]
    InvalidHeader,

    #[error("no signing key matches the token kid")]
    KeyNotFound,

    #[error("access token has expired")]
    TokenExpired,

    #[error("access token has invalid claims: {0}")]
    InvalidClaims(String),

    #[error("access token has no roles")]
    MissingRole,

    #[error("access token lacks the role required for {path}")]
    MissingPathRole { path: String },
}

impl AuthError {
    /// Machine-readable code sent to the client.
    pub fn code(&self) -> &'static str {
        match self {
            Self::HeaderMissing => "AuthorizationHeaderMissing",
            Self::HeaderFormatBearer => "InvalidAuthorizationHeaderFormat_Bearer",
            Self::TokenNotFound => "AuthorizationTokenNotFound",
            Self::HeaderFormat => "InvalidAuthorizationHeaderFormat",
            Self::InvalidHeader | Self::KeyNotFound => "InvalidAuthorizationHeader",
            Self::TokenExpired => "AuthorizationTokenExpired",
            Self::InvalidClaims(_) => "InvalidAuthorizationClaims",
            Self::MissingRole => "MissingRole",
            Self::MissingPathRole { .. } => "MissingPathRole",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::HeaderMissing => "Authorization header is missing from the request",
            Self::HeaderFormatBearer => "Authorization header must start with Bearer",
            Self::TokenNotFound => "Authorization does not contain Token",
            Self::HeaderFormat => "Authorization header must be Bearer token",
            Self::InvalidHeader => "Unable to parse authentication token",
            Self::KeyNotFound => "Unable to find appropriate key",
            Self::TokenExpired => "Authorization bearer token is expired.",
            Self::InvalidClaims(_) => "Failed to validate authorization claims.",
            Self::MissingRole => "Authorization token does not contain any role.",
            Self::MissingPathRole { .. } => "Authorization token does not grant access to this path.",
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    /// Extra detail for the `debug` field of the error body.
    pub fn debug(&self) -> Option<String> {
        match self {
            Self::InvalidClaims(detail) => Some(detail.clone()),
            Self::MissingPathRole { path } => {
                Some(format!("Missing required role for accessing path {path}"))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_claim_and_scope_failures_carry_debug_detail() {
        assert_eq!(AuthError::TokenExpired.debug(), None);
        assert_eq!(
            AuthError::InvalidClaims("InvalidAudience".into()).debug().as_deref(),
            Some("InvalidAudience")
        );
        assert_eq!(
            AuthError::MissingPathRole {
                path: "/vault".into()
            }
            .debug()
            .as_deref(),
            Some("Missing required role for accessing path /vault")
        );
    }

    #[test]
    fn key_failures_share_the_invalid_header_code() {
        assert_eq!(AuthError::InvalidHeader.code(), AuthError::KeyNotFound.code());
        assert_ne!(
            AuthError::InvalidHeader.description(),
            AuthError::KeyNotFound.description()
        );
    }

    #[test]
    fn every_auth_failure_is_unauthorized() {
        let all = [
            AuthError::HeaderMissing,
            AuthError::HeaderFormatBearer,
            AuthError::TokenNotFound,
            AuthError::HeaderFormat,
            AuthError::InvalidHeader,
            AuthError::KeyNotFound,
            AuthError::TokenExpired,
            AuthError::InvalidClaims(String::new()),
            AuthError::MissingRole,
            AuthError::MissingPathRole {
                path: "/vault".into(),
            },
        ];
        assert!(all.iter().all(|e| e.status() == StatusCode::UNAUTHORIZED));
    }
}
