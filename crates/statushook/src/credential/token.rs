// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bearer token cache with pre-expiry refresh.

use std::time::Duration;

use jsonwebtoken::{Algorithm, Header};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::credential::{epoch_secs, JwtInfo};
use crate::error::CredentialError;

/// Tokens are never handed out this close to their expiry.
pub const REFRESH_GUARD: Duration = Duration::from_secs(5 * 60);

/// Claims carried by every callback token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackClaims {
    pub iss: String,
    pub aud: String,
    pub iat: u64,
    pub exp: u64,
}

/// A signed token and its lifetime, as epoch seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub value: String,
    pub issued_at: u64,
    pub expires_at: u64,
}

impl IssuedToken {
    /// True when the token is still outside the refresh guard window at `now`.
    fn usable_at(&self, now: u64) -> bool {
        self.expires_at.saturating_sub(now) > REFRESH_GUARD.as_secs()
    }
}

/// Issues and caches the bearer token attached to outbound callbacks.
///
/// Without signing material the provider runs in unauthenticated mode and
/// never yields a token.
pub struct TokenProvider {
    jwt: Option<JwtInfo>,
    cached: Mutex<Option<IssuedToken>>,
}

impl TokenProvider {
    pub fn new(jwt: Option<JwtInfo>) -> Self {
        Self { jwt, cached: Mutex::new(None) }
    }

    pub fn unauthenticated() -> Self {
        Self::new(None)
    }

    pub fn is_authenticated(&self) -> bool {
        self.jwt.is_some()
    }

    /// Current token, re-issued first if missing or inside the guard window.
    pub fn current_token(&self) -> Result<Option<String>, CredentialError> {
        self.token_at(epoch_secs())
    }

    /// Same as [`current_token`](Self::current_token) against an explicit
    /// clock reading in epoch seconds.
    pub fn token_at(&self, now: u64) -> Result<Option<String>, CredentialError> {
        let Some(ref jwt) = self.jwt else {
            return Ok(None);
        };

        // Held across signing so concurrent callers never race a refresh.
        let mut cached = self.cached.lock();
        if let Some(token) = cached.as_ref().filter(|t| t.usable_at(now)) {
            return Ok(Some(token.value.clone()));
        }

        let issued = issue(jwt, now)?;
        tracing::debug!(kid = jwt.kid(), expires_at = issued.expires_at, "issued callback token");
        let value = issued.value.clone();
        *cached = Some(issued);
        Ok(Some(value))
    }

    /// The cached token, if one has been issued.
    pub fn cached(&self) -> Option<IssuedToken> {
        self.cached.lock().clone()
    }
}

/// Expiry for a token issued at `now`, if it fits a JWT `NumericDate`.
pub(crate) fn expiry(now: u64, ttl_secs: u64) -> Option<u64> {
    now.checked_add(ttl_secs).filter(|&exp| i64::try_from(exp).is_ok())
}

/// Sign a fresh token valid from `now` for the configured TTL.
fn issue(jwt: &JwtInfo, now: u64) -> Result<IssuedToken, CredentialError> {
    let expires_at = expiry(now, jwt.ttl().as_secs())
        .ok_or_else(|| CredentialError::Signing(format!("ttl overflows expiry at {now}")))?;
    let claims = CallbackClaims {
        iss: jwt.issuer().to_owned(),
        aud: jwt.audience().to_owned(),
        iat: now,
        exp: expires_at,
    };
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(jwt.kid().to_owned());

    let value = jsonwebtoken::encode(&header, &claims, jwt.key())
        .map_err(|e| CredentialError::Signing(e.to_string()))?;
    Ok(IssuedToken { value, issued_at: now, expires_at })
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;
