// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;
use std::path::PathBuf;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// A subscriber address that is not an absolute `http(s)` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidAddress(pub String);

impl fmt::Display for InvalidAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid subscriber address {:?}", self.0)
    }
}

impl std::error::Error for InvalidAddress {}

/// Rejections produced by the control API.
///
/// Rendered as `{"error": {"code", "message"}}` with the matching status.
#[derive(Debug)]
pub enum ControlError {
    /// Missing or wrong bearer token on a protected route.
    Unauthorized,
    InvalidSubscriber(InvalidAddress),
    /// The broadcast could not obtain its callback token; nothing was sent.
    Credential(CredentialError),
}

impl ControlError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidSubscriber(_) => StatusCode::BAD_REQUEST,
            Self::Credential(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code carried in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidSubscriber(_) => "INVALID_SUBSCRIBER",
            Self::Credential(_) => "SIGNING_FAILED",
        }
    }
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => f.write_str("missing or invalid bearer token"),
            Self::InvalidSubscriber(e) => e.fmt(f),
            Self::Credential(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for ControlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unauthorized => None,
            Self::InvalidSubscriber(e) => Some(e),
            Self::Credential(e) => Some(e),
        }
    }
}

impl From<InvalidAddress> for ControlError {
    fn from(e: InvalidAddress) -> Self {
        Self::InvalidSubscriber(e)
    }
}

impl From<CredentialError> for ControlError {
    fn from(e: CredentialError) -> Self {
        Self::Credential(e)
    }
}

impl IntoResponse for ControlError {
    fn into_response(self) -> Response {
        let body = json!({ "error": { "code": self.code(), "message": self.to_string() } });
        let mut response = (self.status(), Json(body)).into_response();
        if matches!(self, Self::Unauthorized) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Failures of the signing-credential layer.
///
/// Everything except [`CredentialError::Signing`] is a startup-time
/// configuration failure.
#[derive(Debug)]
pub enum CredentialError {
    /// The credential block itself is unreadable or incomplete.
    Config(String),
    /// The signing key file could not be read.
    KeyRead { path: PathBuf, source: std::io::Error },
    /// The signing key file does not hold a usable RSA private key.
    KeyParse { path: PathBuf, reason: String },
    /// Token signing failed at refresh time.
    Signing(String),
}

impl CredentialError {
    /// True for errors that must stop the process at startup.
    pub fn is_config(&self) -> bool {
        !matches!(self, Self::Signing(_))
    }
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "invalid credential config: {msg}"),
            Self::KeyRead { path, source } => {
                write!(f, "cannot read signing key {}: {source}", path.display())
            }
            Self::KeyParse { path, reason } => {
                write!(f, "malformed signing key {}: {reason}", path.display())
            }
            Self::Signing(msg) => write!(f, "token signing failed: {msg}"),
        }
    }
}

impl std::error::Error for CredentialError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::KeyRead { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[yare::parameterized(
        unauthorized = { ControlError::Unauthorized, 401, "UNAUTHORIZED" },
        invalid_subscriber = {
            ControlError::InvalidSubscriber(InvalidAddress("ftp://x".into())),
            400,
            "INVALID_SUBSCRIBER",
        },
        signing = {
            ControlError::Credential(CredentialError::Signing("bad key".into())),
            500,
            "SIGNING_FAILED",
        },
    )]
    fn control_error_mapping(err: ControlError, status: u16, code: &str) {
        assert_eq!(err.status().as_u16(), status);
        assert_eq!(err.code(), code);
        assert_eq!(err.into_response().status().as_u16(), status);
    }

    #[test]
    fn only_unauthorized_carries_challenge() {
        let resp = ControlError::Unauthorized.into_response();
        let challenge = resp.headers().get(header::WWW_AUTHENTICATE);
        assert_eq!(challenge, Some(&HeaderValue::from_static("Bearer")));

        let resp = ControlError::from(InvalidAddress(" ".into())).into_response();
        assert!(resp.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn credential_failure_keeps_source() {
        let err = ControlError::from(CredentialError::Signing("bad key".into()));
        assert_eq!(err.to_string(), "token signing failed: bad key");
        assert!(std::error::Error::source(&err).is_some());
    }
}
