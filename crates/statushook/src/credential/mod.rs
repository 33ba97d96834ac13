// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signing credentials for outbound callbacks.
//!
//! Optionally configured from `--jwt-config <path>`. When present, every
//! callback carries a short-lived RS256 bearer token; when absent, callbacks
//! are sent unauthenticated.

pub mod token;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jsonwebtoken::EncodingKey;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;
use serde::{Deserialize, Serialize};

use crate::error::CredentialError;

pub use token::{IssuedToken, TokenProvider};

/// Lower bound on token lifetime.
pub const MIN_TTL: Duration = Duration::from_secs(10 * 60);

/// Default token lifetime when the config omits `ttl_secs`.
pub const DEFAULT_TTL_SECS: u64 = 60 * 60;

/// Credential block loaded from `--jwt-config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// PEM file holding the RSA key pair.
    pub signing_key_path: PathBuf,
    /// Key identifier placed in the token header.
    pub kid: String,
    pub issuer: String,
    pub audience: String,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_ttl_secs() -> u64 {
    DEFAULT_TTL_SECS
}

impl JwtConfig {
    /// Load a credential block from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CredentialError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CredentialError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&contents)
            .map_err(|e| CredentialError::Config(format!("{}: {e}", path.display())))
    }
}

/// Loaded, immutable signing material.
#[derive(Clone)]
pub struct JwtInfo {
    key: EncodingKey,
    kid: String,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl JwtInfo {
    /// Build signing material from an already-loaded key. TTL below
    /// [`MIN_TTL`] is raised to it.
    pub fn new(
        key: EncodingKey,
        kid: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            key,
            kid: kid.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl: ttl.max(MIN_TTL),
        }
    }

    /// Validate a credential block and load its signing key.
    pub fn from_config(config: &JwtConfig) -> Result<Self, CredentialError> {
        for (field, value) in
            [("kid", &config.kid), ("issuer", &config.issuer), ("audience", &config.audience)]
        {
            if value.trim().is_empty() {
                return Err(CredentialError::Config(format!("{field} must not be empty")));
            }
        }
        if token::expiry(epoch_secs(), config.ttl_secs).is_none() {
            return Err(CredentialError::Config(format!(
                "ttl_secs {} puts token expiry out of range",
                config.ttl_secs
            )));
        }
        let key = load_signing_key(&config.signing_key_path)?;
        let ttl = Duration::from_secs(config.ttl_secs);
        Ok(Self::new(key, &config.kid, &config.issuer, &config.audience, ttl))
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub(crate) fn key(&self) -> &EncodingKey {
        &self.key
    }
}

impl fmt::Debug for JwtInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtInfo")
            .field("kid", &self.kid)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Read a PEM key-pair file and extract its RSA private key.
///
/// Accepts PKCS#1 (`RSA PRIVATE KEY`) and PKCS#8 (`PRIVATE KEY`) blocks; other
/// blocks in the file (e.g. the public half) are ignored.
pub fn load_signing_key(path: &Path) -> Result<EncodingKey, CredentialError> {
    let contents = std::fs::read(path)
        .map_err(|source| CredentialError::KeyRead { path: path.to_owned(), source })?;
    let parse_err = |reason: String| CredentialError::KeyParse { path: path.to_owned(), reason };

    let blocks = pem::parse_many(&contents).map_err(|e| parse_err(e.to_string()))?;
    let block = blocks
        .iter()
        .find(|b| b.tag().ends_with("PRIVATE KEY"))
        .ok_or_else(|| parse_err("no private key block".into()))?;
    let key = match block.tag() {
        "RSA PRIVATE KEY" => {
            RsaPrivateKey::from_pkcs1_der(block.contents()).map_err(|e| parse_err(e.to_string()))?
        }
        "PRIVATE KEY" => {
            RsaPrivateKey::from_pkcs8_der(block.contents()).map_err(|e| parse_err(e.to_string()))?
        }
        other => return Err(parse_err(format!("unsupported key type: {other}"))),
    };
    key.validate().map_err(|e| parse_err(e.to_string()))?;

    let der = key.to_pkcs1_der().map_err(|e| parse_err(e.to_string()))?;
    Ok(EncodingKey::from_rsa_der(der.as_bytes()))
}

/// Current epoch seconds.
pub fn epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
