// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Data models for the application.

#[cfg(test)]
pub(crate) mod fixtures;
pub mod lead;
pub mod member;
pub mod metrics;
pub mod plan;

pub use lead::{Lead, LeadGoal, NewLead};
pub use member::{
    GuardViolation, IdType, LifecycleAction, Member, MemberPatch, MemberStatus, MemberWithPlan,
    NewMember, PaymentMethod, Transition,
};
pub use metrics::MemberMetrics;
pub use plan::{Plan, PlanRef};
