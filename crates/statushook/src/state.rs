// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::hook::StatusHook;

/// Shared state behind the control API.
pub struct HookState {
    pub hook: StatusHook,
    /// Bearer token required on control routes; `None` disables auth.
    pub auth_token: Option<String>,
}

impl HookState {
    pub fn new(hook: StatusHook, auth_token: Option<String>) -> Self {
        Self { hook, auth_token }
    }
}
