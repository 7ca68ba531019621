// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Admin-editable settings.

use crate::db::{settings, Datastore};
use crate::error::{AppError, Result};

/// Used when the setting is missing or unreadable.
pub const DEFAULT_EXPIRATION_DAYS: u32 = 7;

pub const MAX_EXPIRATION_DAYS: u32 = 365;

/// Days between registration and expiry.
///
/// Never fails: registration must go ahead even when the setting cannot be
/// read, so any problem falls back to [`DEFAULT_EXPIRATION_DAYS`]. Values
/// outside `1..=MAX_EXPIRATION_DAYS` count as unreadable.
pub async fn expiration_days(db: &dyn Datastore) -> u32 {
    match db.get_setting(settings::EXPIRATION_DAYS).await {
        Ok(Some(raw)) => match raw.trim().parse::<u32>() {
            Ok(days) if (1..=MAX_EXPIRATION_DAYS).contains(&days) => days,
            _ => {
                tracing::warn!(value = %raw, "Unparsable expiration_days, using default");
                DEFAULT_EXPIRATION_DAYS
            }
        },
        Ok(None) => DEFAULT_EXPIRATION_DAYS,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read expiration_days, using default");
            DEFAULT_EXPIRATION_DAYS
        }
    }
}

/// Persist a new expiry window.
pub async fn set_expiration_days(db: &dyn Datastore, days: u32) -> Result<()> {
    if days == 0 || days > MAX_EXPIRATION_DAYS {
        return Err(AppError::BadRequest(format!(
            "expiration_days must be between 1 and {}",
            MAX_EXPIRATION_DAYS
        )));
    }

    db.set_setting(settings::EXPIRATION_DAYS, &days.to_string())
        .await?;
    tracing::info!(days, "Updated expiration_days");
    Ok(())
}
