// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Leads from the free-class booking form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// What the prospect wants out of training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum LeadGoal {
    LoseWeight,
    GainMuscle,
    Health,
    Stress,
}

impl LeadGoal {
    pub fn label(self) -> &'static str {
        match self {
            LeadGoal::LoseWeight => "Perder Grasa",
            LeadGoal::GainMuscle => "Ganar Músculo",
            LeadGoal::Health => "Salud/Movilidad",
            LeadGoal::Stress => "Reducir Estrés",
        }
    }
}

/// Lead row from the `leads` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub goal: LeadGoal,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLead {
    pub name: String,
    pub phone: String,
    pub goal: LeadGoal,
    pub created_at: DateTime<Utc>,
}

impl NewLead {
    pub fn into_lead(self, id: String) -> Lead {
        Lead {
            id,
            name: self.name,
            phone: self.phone,
            goal: self.goal,
            created_at: self.created_at,
        }
    }
}
