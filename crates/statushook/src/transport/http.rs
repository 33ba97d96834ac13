// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers for the control API.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::dispatch::BroadcastReport;
use crate::error::ControlError;
use crate::event::EventKind;
use crate::registry::normalize;
use crate::state::HookState;
use crate::transport::auth::Operator;

// -- Request/Response types ---------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub instance_id: String,
    pub subscriber_count: usize,
    pub authenticated: bool,
}

#[derive(Debug, Deserialize)]
pub struct SubscriberRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct AddSubscriberResponse {
    pub url: String,
    pub added: bool,
}

#[derive(Debug, Serialize)]
pub struct RemoveSubscriberResponse {
    pub url: String,
    pub removed: bool,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct FailureInfo {
    pub subscriber: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct BroadcastSummary {
    pub kind: EventKind,
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
    pub failures: Vec<FailureInfo>,
}

impl From<&BroadcastReport> for BroadcastSummary {
    fn from(report: &BroadcastReport) -> Self {
        let mut failures: Vec<_> = report
            .failures()
            .map(|d| FailureInfo {
                subscriber: d.subscriber.clone(),
                reason: d.outcome.to_string(),
            })
            .collect();
        failures.sort_by(|a, b| a.subscriber.cmp(&b.subscriber));
        Self {
            kind: report.kind,
            attempted: report.attempted(),
            delivered: report.delivered(),
            failed: report.failed(),
            failures,
        }
    }
}

// -- Handlers -----------------------------------------------------------------

/// `GET /api/v1/health`
pub async fn health(State(s): State<Arc<HookState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "running".to_owned(),
        instance_id: s.hook.instance_id().to_owned(),
        subscriber_count: s.hook.subscriber_count(),
        authenticated: s.hook.is_authenticated(),
    })
}

/// `GET /api/v1/subscribers`
pub async fn list_subscribers(_: Operator, State(s): State<Arc<HookState>>) -> Json<Vec<String>> {
    let mut subscribers: Vec<_> = s.hook.subscribers().into_iter().collect();
    subscribers.sort();
    Json(subscribers)
}

/// `POST /api/v1/subscribers`
pub async fn add_subscriber(
    _: Operator,
    State(s): State<Arc<HookState>>,
    Json(req): Json<SubscriberRequest>,
) -> Result<Json<AddSubscriberResponse>, ControlError> {
    let added = s.hook.add_subscriber(&req.url)?;
    Ok(Json(AddSubscriberResponse { url: normalize(&req.url).to_owned(), added }))
}

/// `DELETE /api/v1/subscribers`
pub async fn remove_subscriber(
    _: Operator,
    State(s): State<Arc<HookState>>,
    Json(req): Json<SubscriberRequest>,
) -> Json<RemoveSubscriberResponse> {
    let removed = s.hook.remove_subscriber(&req.url);
    Json(RemoveSubscriberResponse { url: normalize(&req.url).to_owned(), removed })
}

/// `POST /api/v1/status/health`: broadcast a health status change.
pub async fn notify_health(
    _: Operator,
    State(s): State<Arc<HookState>>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<BroadcastSummary>, ControlError> {
    let report = s.hook.notify_health(req.status).await?;
    Ok(Json(BroadcastSummary::from(&report)))
}

/// `POST /api/v1/status/session`: broadcast a session status change.
pub async fn notify_session(
    _: Operator,
    State(s): State<Arc<HookState>>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<BroadcastSummary>, ControlError> {
    let report = s.hook.notify_session(req.status).await?;
    Ok(Json(BroadcastSummary::from(&report)))
}
