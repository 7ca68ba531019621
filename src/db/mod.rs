// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Database layer (hosted Postgres behind a REST gateway).
//!
//! Everything above this module talks to the [`Datastore`] trait. The
//! production implementation is [`SupabaseDb`]; [`MemoryDb`] backs offline
//! mode and the tests.

pub mod memory;
pub mod supabase;

pub use memory::MemoryDb;
pub use supabase::SupabaseDb;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{Lead, Member, MemberPatch, MemberWithPlan, NewLead, NewMember, Plan};

/// Table names as constants.
pub mod tables {
    pub const MEMBERS: &str = "members";
    pub const PLANS: &str = "plans";
    pub const LEADS: &str = "leads";
    pub const SETTINGS: &str = "settings";
}

/// Setting keys.
pub mod settings {
    /// Days between registration and `expires_at`.
    pub const EXPIRATION_DAYS: &str = "expiration_days";
}

/// Typed CRUD and file operations against the hosted backend.
///
/// Every method is a single request; there is no multi-record transaction.
/// Writes are last-write-wins.
#[async_trait]
pub trait Datastore: Send + Sync {
    // ─── Plans ───────────────────────────────────────────────────

    async fn list_plans(&self) -> Result<Vec<Plan>, AppError>;

    async fn get_plan(&self, plan_id: &str) -> Result<Option<Plan>, AppError>;

    // ─── Members ─────────────────────────────────────────────────

    /// All members with their plan's display fields, newest first.
    async fn list_members(&self) -> Result<Vec<MemberWithPlan>, AppError>;

    async fn get_member(&self, member_id: &str) -> Result<Option<Member>, AppError>;

    async fn find_member_by_cedula(&self, cedula: &str) -> Result<Option<Member>, AppError>;

    /// Insert a member. A duplicate cedula or QR code is `AppError::Conflict`.
    async fn insert_member(&self, member: &NewMember) -> Result<Member, AppError>;

    /// Apply a partial update. A missing row is `AppError::NotFound`.
    async fn update_member(&self, member_id: &str, patch: &MemberPatch)
        -> Result<Member, AppError>;

    /// Remove a member. A missing row is `AppError::NotFound`.
    async fn delete_member(&self, member_id: &str) -> Result<(), AppError>;

    // ─── Leads ───────────────────────────────────────────────────

    async fn insert_lead(&self, lead: &NewLead) -> Result<Lead, AppError>;

    /// All leads, newest first.
    async fn list_leads(&self) -> Result<Vec<Lead>, AppError>;

    // ─── Settings ────────────────────────────────────────────────

    async fn get_setting(&self, key: &str) -> Result<Option<String>, AppError>;

    async fn set_setting(&self, key: &str, value: &str) -> Result<(), AppError>;

    // ─── File storage ────────────────────────────────────────────

    /// Store an object and return its public URL.
    async fn upload_file(
        &self,
        bucket: &str,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AppError>;

    /// Remove an object. A missing object is `AppError::NotFound`.
    async fn delete_file(&self, bucket: &str, name: &str) -> Result<(), AppError>;
}
