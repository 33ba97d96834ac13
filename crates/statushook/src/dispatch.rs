// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification dispatcher: fans one status event out to every subscriber.
//!
//! - **Concurrent**: one task per subscriber, all joined before returning.
//! - **Isolated**: a slow or broken subscriber only affects its own attempt.
//! - **Best effort**: failures are logged and reported, never retried.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;

use crate::credential::TokenProvider;
use crate::error::CredentialError;
use crate::event::{EventKind, StatusEvent};
use crate::registry::SubscriberRegistry;

/// Per-request timeout for a single callback.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Outcome of one callback attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// Subscriber answered 200.
    Delivered,
    /// Subscriber answered with any other status.
    Rejected(u16),
    /// No response within the request timeout.
    TimedOut,
    /// Connection or protocol failure.
    Transport(String),
    /// The delivery task itself died.
    Aborted(String),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delivered => f.write_str("delivered"),
            Self::Rejected(status) => write!(f, "rejected with status {status}"),
            Self::TimedOut => f.write_str("timed out"),
            Self::Transport(e) => write!(f, "transport error: {e}"),
            Self::Aborted(e) => write!(f, "delivery task aborted: {e}"),
        }
    }
}

/// Result of one attempt against one subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
    pub subscriber: String,
    #[serde(flatten)]
    pub outcome: DeliveryOutcome,
}

/// Per-subscriber outcomes of one broadcast.
#[derive(Debug, Clone, Serialize)]
pub struct BroadcastReport {
    pub kind: EventKind,
    pub deliveries: Vec<Delivery>,
}

impl BroadcastReport {
    fn empty(kind: EventKind) -> Self {
        Self { kind, deliveries: Vec::new() }
    }

    pub fn attempted(&self) -> usize {
        self.deliveries.len()
    }

    pub fn delivered(&self) -> usize {
        self.deliveries.iter().filter(|d| d.outcome.is_delivered()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.delivered()
    }

    pub fn failures(&self) -> impl Iterator<Item = &Delivery> {
        self.deliveries.iter().filter(|d| !d.outcome.is_delivered())
    }

    pub fn outcome_for(&self, subscriber: &str) -> Option<&DeliveryOutcome> {
        self.deliveries.iter().find(|d| d.subscriber == subscriber).map(|d| &d.outcome)
    }
}

/// Sends status events to the registered subscribers.
///
/// Reads the subscriber set and the bearer token through shared handles; owns
/// neither.
pub struct Dispatcher {
    registry: Arc<SubscriberRegistry>,
    tokens: Arc<TokenProvider>,
    client: reqwest::Client,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<SubscriberRegistry>,
        tokens: Arc<TokenProvider>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        crate::ensure_crypto();
        let client = reqwest::Client::builder().build()?;
        Ok(Self { registry, tokens, client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Deliver `event` to every subscriber registered right now.
    ///
    /// Returns once every attempt has finished or timed out. Delivery failures
    /// are reported, not raised; only a token signing failure is an error, and
    /// in that case nothing is sent.
    pub async fn broadcast(&self, event: &StatusEvent) -> Result<BroadcastReport, CredentialError> {
        let kind = event.kind();
        let subscribers = self.registry.snapshot();
        if subscribers.is_empty() {
            tracing::debug!(%kind, "no subscribers, nothing to broadcast");
            return Ok(BroadcastReport::empty(kind));
        }

        let token = match self.tokens.current_token() {
            Ok(token) => token,
            Err(e) => {
                tracing::error!(%kind, err = %e, "cannot sign callback token, broadcast dropped");
                return Err(e);
            }
        };

        let body = match event.to_body() {
            Ok(body) => body,
            Err(e) => {
                let reason = format!("serialize: {e}");
                let deliveries = subscribers
                    .into_iter()
                    .map(|subscriber| Delivery {
                        subscriber,
                        outcome: DeliveryOutcome::Aborted(reason.clone()),
                    })
                    .collect();
                return Ok(BroadcastReport { kind, deliveries });
            }
        };

        let mut handles = Vec::with_capacity(subscribers.len());
        for subscriber in subscribers {
            let client = self.client.clone();
            let body = body.clone();
            let token = token.clone();
            let timeout = self.timeout;
            let url = format!("{subscriber}{}", kind.path());
            let handle = tokio::spawn(async move {
                deliver(&client, &url, body, token.as_deref(), timeout).await
            });
            handles.push((subscriber, handle));
        }

        let mut deliveries = Vec::with_capacity(handles.len());
        for (subscriber, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => DeliveryOutcome::Aborted(e.to_string()),
            };
            if !outcome.is_delivered() {
                tracing::warn!(subscriber = %subscriber, %kind, %outcome, "callback failed");
            }
            deliveries.push(Delivery { subscriber, outcome });
        }

        let report = BroadcastReport { kind, deliveries };
        tracing::info!(
            %kind,
            attempted = report.attempted(),
            delivered = report.delivered(),
            failed = report.failed(),
            "broadcast complete"
        );
        Ok(report)
    }
}

/// POST one callback and classify the result.
async fn deliver(
    client: &reqwest::Client,
    url: &str,
    body: Bytes,
    token: Option<&str>,
    timeout: Duration,
) -> DeliveryOutcome {
    let mut req = client
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .timeout(timeout)
        .body(body);
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }

    match req.send().await {
        Ok(resp) if resp.status() == reqwest::StatusCode::OK => DeliveryOutcome::Delivered,
        Ok(resp) => DeliveryOutcome::Rejected(resp.status().as_u16()),
        Err(e) if e.is_timeout() => DeliveryOutcome::TimedOut,
        Err(e) => DeliveryOutcome::Transport(e.to_string()),
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
