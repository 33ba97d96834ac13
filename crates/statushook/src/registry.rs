// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Set of subscriber base addresses that receive status callbacks.

use std::collections::HashSet;

use parking_lot::RwLock;

use crate::error::InvalidAddress;

/// Thread-safe subscriber set.
///
/// Broadcasts work from a [`snapshot`](Self::snapshot), so mutations made
/// while a broadcast is in flight only affect later broadcasts.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    subscribers: RwLock<HashSet<String>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber. Returns `Ok(false)` if it was already registered.
    pub fn add(&self, address: &str) -> Result<bool, InvalidAddress> {
        if !is_valid_address(address) {
            return Err(InvalidAddress(address.to_owned()));
        }
        let address = normalize(address);
        let added = self.subscribers.write().insert(address.to_owned());
        if added {
            tracing::info!(subscriber = address, "subscriber added");
        }
        Ok(added)
    }

    /// Remove a subscriber. Returns `false` if it was not registered.
    pub fn remove(&self, address: &str) -> bool {
        let address = normalize(address);
        let removed = self.subscribers.write().remove(address);
        if removed {
            tracing::info!(subscriber = address, "subscriber removed");
        }
        removed
    }

    /// Point-in-time copy of the subscriber set.
    pub fn snapshot(&self) -> HashSet<String> {
        self.subscribers.read().clone()
    }

    pub fn len(&self) -> usize {
        self.subscribers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.read().is_empty()
    }
}

/// Trailing slashes are dropped so `http://a/` and `http://a` are one subscriber.
pub fn normalize(address: &str) -> &str {
    address.trim().trim_end_matches('/')
}

/// Whether an address can be used as a subscriber base URL.
pub fn is_valid_address(address: &str) -> bool {
    let address = normalize(address);
    let rest = address
        .strip_prefix("http://")
        .or_else(|| address.strip_prefix("https://"));
    rest.is_some_and(|host| !host.is_empty() && !host.contains(char::is_whitespace))
}
