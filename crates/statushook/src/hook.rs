// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entry points used by the emitting process.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::credential::TokenProvider;
use crate::dispatch::{BroadcastReport, Dispatcher};
use crate::error::{CredentialError, InvalidAddress};
use crate::event::StatusEvent;
use crate::registry::SubscriberRegistry;

/// Status notifier for one emitting instance.
pub struct StatusHook {
    instance_id: String,
    registry: Arc<SubscriberRegistry>,
    tokens: Arc<TokenProvider>,
    dispatcher: Dispatcher,
}

impl StatusHook {
    pub fn new(
        instance_id: impl Into<String>,
        tokens: Arc<TokenProvider>,
        request_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let registry = Arc::new(SubscriberRegistry::new());
        let dispatcher =
            Dispatcher::new(Arc::clone(&registry), Arc::clone(&tokens), request_timeout)?;
        Ok(Self { instance_id: instance_id.into(), registry, tokens, dispatcher })
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_authenticated()
    }

    /// Register a subscriber base URL. Returns `Ok(false)` if already present.
    pub fn add_subscriber(&self, address: &str) -> Result<bool, InvalidAddress> {
        self.registry.add(address)
    }

    pub fn remove_subscriber(&self, address: &str) -> bool {
        self.registry.remove(address)
    }

    pub fn subscribers(&self) -> HashSet<String> {
        self.registry.snapshot()
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    /// Broadcast a health status change.
    pub async fn notify_health(
        &self,
        status: serde_json::Value,
    ) -> Result<BroadcastReport, CredentialError> {
        self.dispatcher.broadcast(&StatusEvent::health(&self.instance_id, status)).await
    }

    /// Broadcast a session status change.
    pub async fn notify_session(
        &self,
        status: serde_json::Value,
    ) -> Result<BroadcastReport, CredentialError> {
        self.dispatcher.broadcast(&StatusEvent::session(&self.instance_id, status)).await
    }
}
