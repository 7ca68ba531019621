// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Upstream access tokens for signed-in admins.
//!
//! The session JWT only carries an opaque session id. The auth provider's
//! access token stays here, so clients never see it.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;

/// Upstream token with expiry information.
#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Session id -> upstream access token, shared across requests.
#[derive(Clone, Default)]
pub struct SessionStore {
    tokens: Arc<DashMap<String, CachedToken>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `access_token` for `ttl` and return the new session id.
    ///
    /// Expired entries are dropped on the way.
    pub fn open(&self, access_token: &str, now: DateTime<Utc>, ttl: Duration) -> String {
        self.tokens.retain(|_, cached| cached.expires_at > now);

        let session_id = uuid::Uuid::new_v4().to_string();
        self.tokens.insert(
            session_id.clone(),
            CachedToken {
                access_token: access_token.to_string(),
                expires_at: now + ttl,
            },
        );
        session_id
    }

    /// Forget the session and hand back its upstream token, if still live.
    pub fn close(&self, session_id: &str, now: DateTime<Utc>) -> Option<String> {
        self.tokens
            .remove(session_id)
            .map(|(_, cached)| cached)
            .filter(|cached| cached.expires_at > now)
            .map(|cached| cached.access_token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
