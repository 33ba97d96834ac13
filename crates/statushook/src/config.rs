// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use crate::registry::is_valid_address;

/// Configuration for the statushook service.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "statushook", version, about = "Signed status callbacks to subscribers")]
pub struct HookConfig {
    /// Host to bind the control API on.
    #[arg(long, default_value = "127.0.0.1", env = "STATUSHOOK_HOST")]
    pub host: String,

    /// Port for the control API.
    #[arg(long, default_value_t = 9810, env = "STATUSHOOK_PORT")]
    pub port: u16,

    /// Bearer token for control API auth. If unset, auth is disabled.
    #[arg(long, env = "STATUSHOOK_AUTH_TOKEN")]
    pub auth_token: Option<String>,

    /// Identifier sent as `jibriId` in every callback. Random if unset.
    #[arg(long, env = "STATUSHOOK_INSTANCE_ID")]
    pub instance_id: Option<String>,

    /// Subscriber base URL registered at startup (repeatable).
    #[arg(long = "subscriber", env = "STATUSHOOK_SUBSCRIBERS", value_delimiter = ',')]
    pub subscribers: Vec<String>,

    /// Path to the JWT signing configuration JSON file. Callbacks are
    /// unauthenticated when unset.
    #[arg(long, env = "STATUSHOOK_JWT_CONFIG")]
    pub jwt_config: Option<PathBuf>,

    /// Per-callback request timeout in milliseconds.
    #[arg(long, default_value_t = 2000, env = "STATUSHOOK_REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: u64,

    /// Log format (text or json).
    #[arg(long, default_value = "text", env = "STATUSHOOK_LOG_FORMAT")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "STATUSHOOK_LOG_LEVEL")]
    pub log_level: String,
}

impl HookConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.request_timeout_ms == 0 {
            anyhow::bail!("--request-timeout-ms must be greater than zero");
        }
        if !matches!(self.log_format.as_str(), "text" | "json") {
            anyhow::bail!("--log-format must be text or json, got {:?}", self.log_format);
        }
        if let Some(bad) = self.subscribers.iter().find(|s| !is_valid_address(s)) {
            anyhow::bail!("invalid subscriber address: {bad:?} (expected http:// or https://)");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// The configured instance id, or a fresh random one.
    pub fn resolve_instance_id(&self) -> String {
        self.instance_id.clone().unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
