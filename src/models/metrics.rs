// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Dashboard counters, recomputed on demand from the cached member list.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::member::{MemberStatus, MemberWithPlan};

/// Member counts by status.
///
/// Expired and inactive members are shown together in one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MemberMetrics {
    pub total: u32,
    pub pending: u32,
    pub active: u32,
    pub expired_or_inactive: u32,
}

impl MemberMetrics {
    pub fn from_members(members: &[MemberWithPlan]) -> Self {
        members
            .iter()
            .fold(Self::default(), |mut metrics, entry| {
                metrics.record(entry.member.status);
                metrics
            })
    }

    fn record(&mut self, status: MemberStatus) {
        self.total += 1;
        match status {
            MemberStatus::Pending => self.pending += 1,
            MemberStatus::Active => self.active += 1,
            MemberStatus::Expired | MemberStatus::Inactive => self.expired_or_inactive += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expired_and_inactive_share_a_bucket() {
        let mut metrics = MemberMetrics::default();
        for status in [
            MemberStatus::Pending,
            MemberStatus::Active,
            MemberStatus::Active,
            MemberStatus::Expired,
            MemberStatus::Inactive,
        ] {
            metrics.record(status);
        }

        assert_eq!(
            metrics,
            MemberMetrics {
                total: 5,
                pending: 1,
                active: 2,
                expired_or_inactive: 2,
            }
        );
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(MemberMetrics::from_members(&[]), MemberMetrics::default());
    }
}
