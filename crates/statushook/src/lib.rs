// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Statushook: signed status-change callbacks to a dynamic set of subscribers.

pub mod config;
pub mod credential;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod hook;
pub mod registry;
pub mod state;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::{Arc, Once};

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::HookConfig;
use crate::credential::{JwtConfig, JwtInfo, TokenProvider};
use crate::hook::StatusHook;
use crate::state::HookState;
use crate::transport::build_router;

static CRYPTO_INIT: Once = Once::new();

/// Install the ring crypto provider for reqwest/rustls.
/// Only the first call has effect.
pub fn ensure_crypto() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Load signing material if configured. Any failure here is fatal.
pub fn load_token_provider(config: &HookConfig) -> anyhow::Result<TokenProvider> {
    let Some(ref path) = config.jwt_config else {
        tracing::warn!("no jwt config, callbacks will be sent unauthenticated");
        return Ok(TokenProvider::unauthenticated());
    };
    let jwt = JwtInfo::from_config(&JwtConfig::load(path)?)?;
    tracing::info!(kid = jwt.kid(), ttl_secs = jwt.ttl().as_secs(), "jwt signing enabled");
    Ok(TokenProvider::new(Some(jwt)))
}

/// Build the status hook and seed startup subscribers.
pub fn build_hook(config: &HookConfig) -> anyhow::Result<StatusHook> {
    let tokens = Arc::new(load_token_provider(config)?);
    let hook = StatusHook::new(config.resolve_instance_id(), tokens, config.request_timeout())?;
    for subscriber in &config.subscribers {
        hook.add_subscriber(subscriber)?;
    }
    Ok(hook)
}

/// Run the control API until shutdown.
pub async fn run(config: HookConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let shutdown = CancellationToken::new();

    let hook = build_hook(&config)?;
    tracing::info!(
        instance_id = hook.instance_id(),
        subscribers = hook.subscriber_count(),
        authenticated = hook.is_authenticated(),
        "statushook listening on {addr}"
    );
    let state = Arc::new(HookState::new(hook, config.auth_token.clone()));

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown requested");
            }
            shutdown.cancel();
        });
    }

    let router = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown.cancelled_owned()).await?;

    Ok(())
}
