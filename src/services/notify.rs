// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Email notifications through the hosted `send-email` function.
//!
//! Dispatch is fire-and-forget: the caller never waits for delivery and a
//! failed send is only logged.

use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Message accepted by the email function, sent as `{type, payload}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum Notification {
    /// Sent to the member when an email was given at registration.
    Welcome {
        name: String,
        email: String,
        qr_code: String,
    },
    /// Sent to the front desk for every new registration.
    AdminNotification {
        new_member_name: String,
        plan: String,
        email: Option<String>,
        phone: String,
    },
    NewLead {
        name: String,
        phone: String,
        goal: String,
    },
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::Welcome { .. } => "welcome",
            Notification::AdminNotification { .. } => "admin_notification",
            Notification::NewLead { .. } => "new_lead",
        }
    }
}

#[derive(Clone)]
enum Transport {
    Disabled,
    Http {
        http: reqwest::Client,
        url: String,
        api_key: String,
    },
    Capture(Arc<Mutex<Vec<Notification>>>),
}

/// Handle used by the workflows to send notifications.
#[derive(Clone)]
pub struct Notifier {
    transport: Transport,
}

impl Notifier {
    /// POST notifications to the function at `url`.
    pub fn http(url: &str, api_key: &str) -> Self {
        Self {
            transport: Transport::Http {
                http: reqwest::Client::new(),
                url: url.to_string(),
                api_key: api_key.to_string(),
            },
        }
    }

    /// Drop every notification.
    pub fn disabled() -> Self {
        Self {
            transport: Transport::Disabled,
        }
    }

    /// Record notifications in memory instead of sending them.
    pub fn capture() -> Self {
        Self {
            transport: Transport::Capture(Arc::new(Mutex::new(Vec::new()))),
        }
    }

    /// Notifications recorded so far by a [`Notifier::capture`] handle.
    pub fn captured(&self) -> Vec<Notification> {
        match &self.transport {
            Transport::Capture(sink) => sink
                .lock()
                .map(|sent| sent.clone())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Queue `notification` for delivery and return immediately.
    pub fn dispatch(&self, notification: Notification) {
        match &self.transport {
            Transport::Disabled => {
                tracing::debug!(kind = notification.kind(), "Notifications disabled, skipping");
            }
            Transport::Capture(sink) => {
                if let Ok(mut sent) = sink.lock() {
                    sent.push(notification);
                }
            }
            Transport::Http { http, url, api_key } => {
                let http = http.clone();
                let url = url.clone();
                let api_key = api_key.clone();
                tokio::spawn(async move {
                    send(&http, &url, &api_key, &notification).await;
                });
            }
        }
    }
}

async fn send(http: &reqwest::Client, url: &str, api_key: &str, notification: &Notification) {
    let kind = notification.kind();
    let result = http
        .post(url)
        .bearer_auth(api_key)
        .json(notification)
        .send()
        .await;

    match result {
        Ok(response) if response.status().is_success() => {
            tracing::debug!(kind, "Notification sent");
        }
        Ok(response) => {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(kind, status = %status, body = %body, "Notification rejected");
        }
        Err(e) => {
            tracing::warn!(kind, error = %e, "Notification send failed");
        }
    }
}
