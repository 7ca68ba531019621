// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Datelike, SecondsFormat, Utc};

const SHORT_MONTHS: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Day and abbreviated Spanish month, e.g. `"15 jun"`, as shown in the member table.
pub fn format_short_day(date: DateTime<Utc>) -> String {
    format!("{} {}", date.day(), SHORT_MONTHS[date.month0() as usize])
}
