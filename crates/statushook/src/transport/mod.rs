// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP control API for the status hook.

pub mod auth;
pub mod http;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::HookState;

/// Build the axum `Router` with all control routes.
pub fn build_router(state: Arc<HookState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(http::health))
        // Subscriber management
        .route(
            "/api/v1/subscribers",
            get(http::list_subscribers).post(http::add_subscriber).delete(http::remove_subscriber),
        )
        // Status notifications
        .route("/api/v1/status/health", post(http::notify_health))
        .route("/api/v1/status/session", post(http::notify_session))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
