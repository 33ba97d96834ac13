// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status events delivered to subscribers.

use std::fmt;

use serde::Serialize;

/// Which kind of status changed. Selects the callback path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Health,
    Session,
}

impl EventKind {
    /// Path appended to the subscriber base address.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Health => "/v1/status",
            Self::Session => "/v1/session/status",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Session => "session",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One status change from the emitting instance. The status payload is
/// passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    Health { instance_id: String, status: serde_json::Value },
    Session { instance_id: String, status: serde_json::Value },
}

/// Wire body of a callback.
#[derive(Debug, Serialize)]
struct CallbackBody<'a> {
    #[serde(rename = "jibriId")]
    instance_id: &'a str,
    status: &'a serde_json::Value,
}

impl StatusEvent {
    pub fn health(instance_id: impl Into<String>, status: serde_json::Value) -> Self {
        Self::Health { instance_id: instance_id.into(), status }
    }

    pub fn session(instance_id: impl Into<String>, status: serde_json::Value) -> Self {
        Self::Session { instance_id: instance_id.into(), status }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::Health { .. } => EventKind::Health,
            Self::Session { .. } => EventKind::Session,
        }
    }

    pub fn instance_id(&self) -> &str {
        match self {
            Self::Health { instance_id, .. } | Self::Session { instance_id, .. } => instance_id,
        }
    }

    pub fn status(&self) -> &serde_json::Value {
        match self {
            Self::Health { status, .. } | Self::Session { status, .. } => status,
        }
    }

    /// Serialize the callback body once per broadcast.
    pub fn to_body(&self) -> serde_json::Result<bytes::Bytes> {
        let body = CallbackBody { instance_id: self.instance_id(), status: self.status() };
        Ok(bytes::Bytes::from(serde_json::to_vec(&body)?))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[yare::parameterized(
        health = { StatusEvent::health("j1", json!({})), "/v1/status", "health" },
        session = { StatusEvent::session("j1", json!({})), "/v1/session/status", "session" },
    )]
    fn routes_by_kind(event: StatusEvent, path: &str, name: &str) {
        assert_eq!(event.kind().path(), path);
        assert_eq!(event.kind().to_string(), name);
    }

    #[test]
    fn body_carries_instance_id_and_status() -> anyhow::Result<()> {
        let status = json!({ "busyStatus": "IDLE", "health": { "healthStatus": "HEALTHY" } });
        let event = StatusEvent::health("jibri-7", status.clone());

        let body: serde_json::Value = serde_json::from_slice(&event.to_body()?)?;
        assert_eq!(body["jibriId"], "jibri-7");
        assert_eq!(body["status"], status);
        assert_eq!(body.as_object().map(|o| o.len()), Some(2));
        Ok(())
    }

    #[test]
    fn session_body_uses_same_shape() -> anyhow::Result<()> {
        let event = StatusEvent::session("jibri-7", json!({ "sessionId": "abc", "state": "ON" }));
        let body: serde_json::Value = serde_json::from_slice(&event.to_body()?)?;
        assert_eq!(body["jibriId"], "jibri-7");
        assert_eq!(body["status"]["sessionId"], "abc");
        Ok(())
    }
}
