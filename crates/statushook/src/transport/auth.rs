// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operator authentication for control routes.
//!
//! Handlers that mutate or broadcast take an [`Operator`] argument; the
//! health route does not, so it stays reachable without a token.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::ControlError;
use crate::state::HookState;

/// Proof that the request carried the configured operator token, or that no
/// token is configured.
#[derive(Debug, Clone, Copy)]
pub struct Operator;

impl FromRequestParts<Arc<HookState>> for Operator {
    type Rejection = ControlError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<HookState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(ref expected) = state.auth_token else {
            return Ok(Operator);
        };
        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token);
        match presented {
            Some(token) if tokens_match(token, expected) => Ok(Operator),
            _ => {
                tracing::debug!(path = %parts.uri.path(), "control request rejected");
                Err(ControlError::Unauthorized)
            }
        }
    }
}

/// Token part of a `Bearer` authorization value. The scheme is case-insensitive.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then(|| token.trim()).filter(|t| !t.is_empty())
}

/// Compares every byte regardless of where the first mismatch is.
fn tokens_match(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}
