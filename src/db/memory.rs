// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! In-process datastore for offline mode and tests.
//!
//! Enforces the same uniqueness rules as the hosted schema (cedula and QR
//! code) and can be told to fail uploads or writes so failure paths are
//! testable.

use anyhow::Context;
use async_trait::async_trait;
use dashmap::DashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::db::Datastore;
use crate::error::AppError;
use crate::models::{Lead, Member, MemberPatch, MemberWithPlan, NewLead, NewMember, Plan};

/// DashMap-backed datastore. Cloning shares the underlying tables.
#[derive(Clone, Default)]
pub struct MemoryDb {
    plans: Arc<DashMap<String, Plan>>,
    members: Arc<DashMap<String, Member>>,
    leads: Arc<DashMap<String, Lead>>,
    settings: Arc<DashMap<String, String>>,
    files: Arc<DashMap<String, Vec<u8>>>,
    fail_uploads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the plan catalog.
    pub fn with_plans(self, plans: impl IntoIterator<Item = Plan>) -> Self {
        for plan in plans {
            self.plans.insert(plan.id.clone(), plan);
        }
        self
    }

    /// Seed the plan catalog from a JSON array of plans.
    pub fn with_plans_from_file(self, path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read plan catalog {}", path.display()))?;
        let plans: Vec<Plan> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse plan catalog {}", path.display()))?;
        Ok(self.with_plans(plans))
    }

    /// Make every upload fail with a storage error.
    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Make every member/lead/setting write fail with a storage error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored objects across all buckets.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    fn check_writable(&self, table: &str) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Storage(format!("{} write unavailable", table)));
        }
        Ok(())
    }

    fn with_plan(&self, member: Member) -> MemberWithPlan {
        let plan = self.plans.get(&member.plan_id).map(|p| p.plan_ref());
        MemberWithPlan { member, plan }
    }
}

#[async_trait]
impl Datastore for MemoryDb {
    async fn list_plans(&self) -> Result<Vec<Plan>, AppError> {
        let mut plans: Vec<Plan> = self.plans.iter().map(|p| p.value().clone()).collect();
        plans.sort_by(|a, b| a.price.total_cmp(&b.price));
        Ok(plans)
    }

    async fn get_plan(&self, plan_id: &str) -> Result<Option<Plan>, AppError> {
        Ok(self.plans.get(plan_id).map(|p| p.value().clone()))
    }

    async fn list_members(&self) -> Result<Vec<MemberWithPlan>, AppError> {
        let mut members: Vec<MemberWithPlan> = self
            .members
            .iter()
            .map(|m| self.with_plan(m.value().clone()))
            .collect();
        members.sort_by(|a, b| b.member.created_at.cmp(&a.member.created_at));
        Ok(members)
    }

    async fn get_member(&self, member_id: &str) -> Result<Option<Member>, AppError> {
        Ok(self.members.get(member_id).map(|m| m.value().clone()))
    }

    async fn find_member_by_cedula(&self, cedula: &str) -> Result<Option<Member>, AppError> {
        Ok(self
            .members
            .iter()
            .find(|m| m.cedula == cedula)
            .map(|m| m.value().clone()))
    }

    async fn insert_member(&self, member: &NewMember) -> Result<Member, AppError> {
        self.check_writable("members")?;

        let duplicate = self
            .members
            .iter()
            .any(|m| m.cedula == member.cedula || m.qr_code == member.qr_code);
        if duplicate {
            return Err(AppError::Conflict("members row already exists".to_string()));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let stored = member.clone().into_member(id.clone());
        self.members.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_member(
        &self,
        member_id: &str,
        patch: &MemberPatch,
    ) -> Result<Member, AppError> {
        self.check_writable("members")?;

        let mut entry = self
            .members
            .get_mut(member_id)
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", member_id)))?;
        patch.apply_to(entry.value_mut());
        Ok(entry.value().clone())
    }

    async fn delete_member(&self, member_id: &str) -> Result<(), AppError> {
        self.check_writable("members")?;

        self.members
            .remove(member_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", member_id)))
    }

    async fn insert_lead(&self, lead: &NewLead) -> Result<Lead, AppError> {
        self.check_writable("leads")?;

        let id = uuid::Uuid::new_v4().to_string();
        let stored = lead.clone().into_lead(id.clone());
        self.leads.insert(id, stored.clone());
        Ok(stored)
    }

    async fn list_leads(&self) -> Result<Vec<Lead>, AppError> {
        let mut leads: Vec<Lead> = self.leads.iter().map(|l| l.value().clone()).collect();
        leads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(leads)
    }

    async fn get_setting(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.settings.get(key).map(|v| v.value().clone()))
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.check_writable("settings")?;
        self.settings.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn upload_file(
        &self,
        bucket: &str,
        name: &str,
        _content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AppError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(AppError::Storage(format!("bucket {} unavailable", bucket)));
        }

        let path = format!("{}/{}", bucket, name);
        self.files.insert(path.clone(), bytes);
        Ok(format!("memory://{}", path))
    }

    async fn delete_file(&self, bucket: &str, name: &str) -> Result<(), AppError> {
        self.files
            .remove(&format!("{}/{}", bucket, name))
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Object {}/{} not found", bucket, name)))
    }
}
