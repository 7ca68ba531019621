// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Booking form leads.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::db::Datastore;
use crate::error::Result;
use crate::models::{Lead, LeadGoal, NewLead};
use crate::services::notify::{Notification, Notifier};
use crate::validation::{validate_phone, ValidationError};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LeadRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    pub phone: String,
    pub goal: LeadGoal,
}

/// Admin lead list query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub goal: Option<LeadGoal>,
}

impl LeadFilter {
    /// Name matches case-insensitively, phone by plain substring.
    pub fn matches(&self, lead: &Lead) -> bool {
        if self.goal.is_some_and(|goal| goal != lead.goal) {
            return false;
        }

        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                lead.name.to_lowercase().contains(&term.to_lowercase())
                    || lead.phone.contains(term)
            }
        }
    }
}

/// Validate and store a lead, then notify the front desk.
pub async fn submit_lead(
    db: &dyn Datastore,
    notifier: &Notifier,
    request: LeadRequest,
    now: DateTime<Utc>,
) -> Result<Lead> {
    let request = LeadRequest {
        name: request.name.trim().to_string(),
        phone: request.phone.trim().to_string(),
        goal: request.goal,
    };

    request.validate().map_err(|_| {
        ValidationError::new("name", "El nombre debe tener entre 2 y 100 caracteres")
    })?;
    validate_phone("phone", &request.phone, "El teléfono")?;

    let lead = db
        .insert_lead(&NewLead {
            name: request.name,
            phone: request.phone,
            goal: request.goal,
            created_at: now,
        })
        .await?;

    tracing::info!(lead_id = %lead.id, goal = lead.goal.label(), "Lead captured");
    notifier.dispatch(Notification::NewLead {
        name: lead.name.clone(),
        phone: lead.phone.clone(),
        goal: lead.goal.label().to_string(),
    });

    Ok(lead)
}

/// Leads matching `filter`, newest first.
pub async fn list_leads(db: &dyn Datastore, filter: &LeadFilter) -> Result<Vec<Lead>> {
    let leads = db.list_leads().await?;
    Ok(leads.into_iter().filter(|lead| filter.matches(lead)).collect())
}
