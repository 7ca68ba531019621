// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Rejects a second concurrent operation on the same key.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::error::AppError;

/// Set of keys with an operation currently running.
#[derive(Clone, Default)]
pub struct InFlightGuard {
    keys: Arc<DashMap<String, ()>>,
}

/// Held while an operation runs; the key is released on drop.
#[must_use]
pub struct InFlightTicket {
    keys: Arc<DashMap<String, ()>>,
    key: String,
}

impl InFlightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`, or fail with `Conflict` if it is already claimed.
    pub fn try_acquire(&self, key: impl Into<String>) -> Result<InFlightTicket, AppError> {
        let key = key.into();
        match self.keys.entry(key.clone()) {
            Entry::Occupied(_) => {
                tracing::warn!(key = %key, "Rejected concurrent operation");
                Err(AppError::Conflict(
                    "Ya hay una operación en curso para este registro".to_string(),
                ))
            }
            Entry::Vacant(slot) => {
                slot.insert(());
                Ok(InFlightTicket {
                    keys: Arc::clone(&self.keys),
                    key,
                })
            }
        }
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        self.keys.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_claim_rejected_until_release() {
        let guard = InFlightGuard::new();

        let ticket = guard.try_acquire("member:1").unwrap();
        assert!(guard.is_held("member:1"));
        assert!(matches!(
            guard.try_acquire("member:1"),
            Err(AppError::Conflict(_))
        ));
        assert!(guard.try_acquire("member:2").is_ok());

        drop(ticket);
        assert!(!guard.is_held("member:1"));
        assert!(guard.try_acquire("member:1").is_ok());
    }
}
