// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Membership plans. Owned by the catalog, read-only here.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Plan row from the `plans` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Plan {
    pub id: String,
    pub name: String,
    /// e.g. "mensual", "trimestral"
    pub duration_type: String,
    /// Price in pesos
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Plan {
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.duration_type)
    }

    pub fn plan_ref(&self) -> PlanRef {
        PlanRef {
            name: self.name.clone(),
            duration_type: self.duration_type.clone(),
        }
    }
}

/// Plan fields embedded in a member listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRef {
    pub name: String,
    pub duration_type: String,
}

impl PlanRef {
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.duration_type)
    }
}
