// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Cached member list for the admin screens.
//!
//! The cache is filled by [`MemberDirectory::refresh`] and afterwards only
//! touched after a datastore write has been confirmed.

use futures_util::future::try_join;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::db::Datastore;
use crate::error::Result;
use crate::models::{Member, MemberMetrics, MemberStatus, MemberWithPlan, Plan};

/// Search box and status dropdown of the member list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<MemberStatus>,
}

impl MemberFilter {
    /// Case-insensitive substring of name or cedula, plus exact status.
    pub fn matches(&self, entry: &MemberWithPlan) -> bool {
        if let Some(status) = self.status {
            if entry.member.status != status {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                entry.member.full_name.to_lowercase().contains(&term)
                    || entry.member.cedula.to_lowercase().contains(&term)
            }
        }
    }
}

#[derive(Default)]
struct DirectoryState {
    members: Vec<MemberWithPlan>,
    plans: Vec<Plan>,
    loaded: bool,
}

pub struct MemberDirectory {
    db: Arc<dyn Datastore>,
    state: RwLock<DirectoryState>,
}

impl MemberDirectory {
    pub fn new(db: Arc<dyn Datastore>) -> Self {
        Self {
            db,
            state: RwLock::new(DirectoryState::default()),
        }
    }

    /// Reload members and plans from the datastore.
    ///
    /// On failure the previous contents are kept.
    pub async fn refresh(&self) -> Result<()> {
        let (members, plans) = try_join(self.db.list_members(), self.db.list_plans()).await?;

        let mut state = self.state.write().await;
        tracing::debug!(members = members.len(), plans = plans.len(), "Directory refreshed");
        state.members = members;
        state.plans = plans;
        state.loaded = true;
        Ok(())
    }

    /// Refresh once if the cache has never been filled.
    pub async fn ensure_loaded(&self) -> Result<()> {
        if self.is_loaded().await {
            return Ok(());
        }
        self.refresh().await
    }

    pub async fn is_loaded(&self) -> bool {
        self.state.read().await.loaded
    }

    /// Members matching `filter`, newest first.
    pub async fn list(&self, filter: &MemberFilter) -> Vec<MemberWithPlan> {
        self.state
            .read()
            .await
            .members
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect()
    }

    pub async fn find(&self, member_id: &str) -> Option<MemberWithPlan> {
        self.state
            .read()
            .await
            .members
            .iter()
            .find(|entry| entry.member.id == member_id)
            .cloned()
    }

    pub async fn metrics(&self) -> MemberMetrics {
        MemberMetrics::from_members(&self.state.read().await.members)
    }

    /// Store a record the datastore has just confirmed.
    ///
    /// Replaces the cached copy, or inserts it in `created_at` order when it
    /// is not cached yet. Does nothing before the first refresh.
    pub async fn upsert(&self, member: Member) {
        let mut state = self.state.write().await;
        if !state.loaded {
            return;
        }

        if let Some(entry) = state
            .members
            .iter_mut()
            .find(|entry| entry.member.id == member.id)
        {
            entry.member = member;
            return;
        }

        let plan = state
            .plans
            .iter()
            .find(|plan| plan.id == member.plan_id)
            .map(Plan::plan_ref);
        let position = state
            .members
            .iter()
            .position(|entry| entry.member.created_at <= member.created_at)
            .unwrap_or(state.members.len());
        state
            .members
            .insert(position, MemberWithPlan { member, plan });
    }

    /// Drop a record the datastore has just deleted.
    pub async fn remove(&self, member_id: &str) {
        self.state
            .write()
            .await
            .members
            .retain(|entry| entry.member.id != member_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDb;
    use crate::models::fixtures;
    use chrono::{Duration, Utc};

    async fn seeded() -> (MemoryDb, MemberDirectory) {
        let db = MemoryDb::new().with_plans([fixtures::plan("plan-monthly", "Mensual")]);
        let now = Utc::now();
        db.insert_member(&fixtures::new_member(
            "Ana Pérez",
            "1234567",
            MemberStatus::Pending,
            now - Duration::days(2),
        ))
        .await
        .unwrap();
        db.insert_member(&fixtures::new_member(
            "Luis Gómez",
            "7654321",
            MemberStatus::Active,
            now - Duration::days(1),
        ))
        .await
        .unwrap();
        db.insert_member(&fixtures::new_member(
            "ana maría ruiz",
            "5550001",
            MemberStatus::Inactive,
            now,
        ))
        .await
        .unwrap();

        let directory = MemberDirectory::new(Arc::new(db.clone()));
        directory.refresh().await.unwrap();
        (db, directory)
    }

    #[tokio::test]
    async fn test_empty_until_refreshed() {
        let db = MemoryDb::new();
        let directory = MemberDirectory::new(Arc::new(db));
        assert!(!directory.is_loaded().await);
        assert!(directory.list(&MemberFilter::default()).await.is_empty());
    }

    #[tokio::test]
    async fn test_search_name_case_insensitive() {
        let (_db, directory) = seeded().await;

        let filter = MemberFilter {
            search: Some("ANA".to_string()),
            status: None,
        };
        let names: Vec<String> = directory
            .list(&filter)
            .await
            .into_iter()
            .map(|e| e.member.full_name)
            .collect();
        assert_eq!(names, vec!["ana maría ruiz", "Ana Pérez"]);
    }

    #[tokio::test]
    async fn test_search_cedula_and_status() {
        let (_db, directory) = seeded().await;

        let by_cedula = MemberFilter {
            search: Some("cc 7654".to_string()),
            status: None,
        };
        assert_eq!(directory.list(&by_cedula).await.len(), 1);

        let by_status = MemberFilter {
            search: Some("ana".to_string()),
            status: Some(MemberStatus::Pending),
        };
        let found = directory.list(&by_status).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].member.full_name, "Ana Pérez");
    }

    #[tokio::test]
    async fn test_metrics_and_plan_labels() {
        let (_db, directory) = seeded().await;

        let metrics = directory.metrics().await;
        assert_eq!(metrics.total, 3);
        assert_eq!(metrics.pending, 1);
        assert_eq!(metrics.active, 1);
        assert_eq!(metrics.expired_or_inactive, 1);

        let all = directory.list(&MemberFilter::default()).await;
        assert!(all.iter().all(|e| e.plan_label() == "Mensual (mensual)"));
    }

    #[tokio::test]
    async fn test_new_rows_visible_after_refresh() {
        let (db, directory) = seeded().await;
        db.insert_member(&fixtures::new_member(
            "Nuevo",
            "9990001",
            MemberStatus::Pending,
            Utc::now(),
        ))
        .await
        .unwrap();

        // Not visible until the next refresh.
        assert_eq!(directory.metrics().await.total, 3);
        directory.refresh().await.unwrap();
        assert_eq!(directory.metrics().await.total, 4);
    }

    #[tokio::test]
    async fn test_upsert_and_remove() {
        let (db, directory) = seeded().await;
        let newest = db
            .insert_member(&fixtures::new_member(
                "Carla",
                "8880001",
                MemberStatus::Pending,
                Utc::now() + Duration::seconds(5),
            ))
            .await
            .unwrap();

        directory.upsert(newest.clone()).await;
        let all = directory.list(&MemberFilter::default()).await;
        assert_eq!(all[0].member.id, newest.id);
        assert_eq!(all[0].plan_label(), "Mensual (mensual)");

        directory.remove(&newest.id).await;
        assert!(directory.find(&newest.id).await.is_none());
        assert_eq!(directory.metrics().await.total, 3);
    }
}
