// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Guarded admin status changes: pay, deactivate, reactivate, delete.
//!
//! Every operation reads the stored record, looks the pair up in
//! [`MemberStatus::apply`], performs one single-record write and only then
//! updates the cached directory.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::db::Datastore;
use crate::error::{AppError, Result};
use crate::models::{LifecycleAction, MemberPatch, MemberStatus, Transition};
use crate::services::directory::MemberDirectory;

/// What a lifecycle operation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionOutcome {
    pub member_id: String,
    pub action: LifecycleAction,
    pub previous: MemberStatus,
    /// `None` once the record has been deleted.
    pub current: Option<MemberStatus>,
    /// False when the record was already in the resulting state.
    pub changed: bool,
}

pub struct LifecycleService {
    db: Arc<dyn Datastore>,
    directory: Arc<MemberDirectory>,
}

impl LifecycleService {
    pub fn new(db: Arc<dyn Datastore>, directory: Arc<MemberDirectory>) -> Self {
        Self { db, directory }
    }

    pub async fn mark_as_paid(
        &self,
        member_id: &str,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome> {
        self.apply(member_id, LifecycleAction::MarkAsPaid, now).await
    }

    pub async fn deactivate(
        &self,
        member_id: &str,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome> {
        self.apply(member_id, LifecycleAction::Deactivate, now).await
    }

    pub async fn reactivate(
        &self,
        member_id: &str,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome> {
        self.apply(member_id, LifecycleAction::Reactivate, now).await
    }

    pub async fn delete(
        &self,
        member_id: &str,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome> {
        self.apply(member_id, LifecycleAction::Delete, now).await
    }

    /// Run `action` against the stored record.
    ///
    /// Unknown ids are `NotFound`; pairs outside the table are
    /// `GuardViolation` and nothing is written.
    pub async fn apply(
        &self,
        member_id: &str,
        action: LifecycleAction,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome> {
        let member = self
            .db
            .get_member(member_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", member_id)))?;
        let previous = member.status;

        let transition = previous.apply(action).inspect_err(|_| {
            tracing::warn!(
                member_id,
                operation = action.as_str(),
                status = previous.as_str(),
                "Rejected lifecycle operation"
            );
        })?;

        let current = match transition {
            Transition::Stay => {
                tracing::debug!(
                    member_id,
                    operation = action.as_str(),
                    "Already in target state"
                );
                return Ok(TransitionOutcome {
                    member_id: member_id.to_string(),
                    action,
                    previous,
                    current: Some(previous),
                    changed: false,
                });
            }
            Transition::Move(next) => {
                let patch = MemberPatch {
                    status: Some(next),
                    paid_at: action.stamps_payment().then_some(now),
                };
                let updated = self.db.update_member(member_id, &patch).await?;
                self.directory.upsert(updated).await;
                Some(next)
            }
            Transition::Remove => {
                self.db.delete_member(member_id).await?;
                self.directory.remove(member_id).await;
                None
            }
        };

        tracing::info!(
            member_id,
            operation = action.as_str(),
            from = previous.as_str(),
            to = current.map(MemberStatus::as_str).unwrap_or("deleted"),
            "Member status changed"
        );

        Ok(TransitionOutcome {
            member_id: member_id.to_string(),
            action,
            previous,
            current,
            changed: true,
        })
    }
}
