// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Admin routes. The session middleware is applied in routes/mod.rs.

use crate::error::{AppError, Result};
use crate::middleware::AdminSession;
use crate::models::{
    Lead, LeadGoal, LifecycleAction, Member, MemberMetrics, MemberStatus, MemberWithPlan,
};
use crate::services::directory::MemberFilter;
use crate::services::leads::{self, LeadFilter};
use crate::services::lifecycle::TransitionOutcome;
use crate::services::qr::qr_image_url;
use crate::services::settings;
use crate::time_utils::{format_short_day, format_utc_rfc3339};
use crate::validation::ValidationError;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/members", get(list_members))
        .route("/admin/members/{id}", get(get_member).delete(delete_member))
        .route("/admin/members/{id}/pay", post(mark_as_paid))
        .route("/admin/members/{id}/deactivate", post(deactivate))
        .route("/admin/members/{id}/reactivate", post(reactivate))
        .route("/admin/metrics", get(get_metrics))
        .route("/admin/leads", get(list_leads))
        .route("/admin/settings", get(get_settings).put(update_settings))
}

// ─── Member List ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct MembersQuery {
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    status: Option<MemberStatus>,
    /// Reload from the datastore before filtering.
    #[serde(default)]
    refresh: Option<bool>,
}

/// One row of the member table.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MemberSummary {
    pub id: String,
    pub full_name: String,
    pub cedula: String,
    pub phone: String,
    pub plan: String,
    pub status: MemberStatus,
    pub status_label: String,
    pub created_at: String,
    pub created_label: String,
    /// Payment date for active members, expiry date otherwise.
    pub date_info: String,
    pub date_label: String,
    pub selfie_url: Option<String>,
    pub available_actions: Vec<LifecycleAction>,
}

impl From<&MemberWithPlan> for MemberSummary {
    fn from(entry: &MemberWithPlan) -> Self {
        let member = &entry.member;
        let date_info = entry.date_info();
        Self {
            id: member.id.clone(),
            full_name: member.full_name.clone(),
            cedula: member.cedula.clone(),
            phone: member.phone.clone(),
            plan: entry.plan_label(),
            status: member.status,
            status_label: member.status.label().to_string(),
            created_at: format_utc_rfc3339(member.created_at),
            created_label: format_short_day(member.created_at),
            date_info: format_utc_rfc3339(date_info),
            date_label: format_short_day(date_info),
            selfie_url: member.selfie_url.clone(),
            available_actions: member.status.available_actions(),
        }
    }
}

async fn list_members(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MembersQuery>,
) -> Result<Json<Vec<MemberSummary>>> {
    if query.refresh == Some(true) {
        state.directory.refresh().await?;
    } else {
        state.directory.ensure_loaded().await?;
    }

    let filter = MemberFilter {
        search: query.search,
        status: query.status,
    };
    let members = state.directory.list(&filter).await;
    Ok(Json(members.iter().map(MemberSummary::from).collect()))
}

// ─── Member Detail ───────────────────────────────────────────

#[derive(Serialize)]
pub struct MemberDetail {
    #[serde(flatten)]
    pub member: Member,
    pub plan: String,
    pub status_label: String,
    pub payment_label: String,
    pub qr_image_url: String,
    pub available_actions: Vec<LifecycleAction>,
}

impl From<MemberWithPlan> for MemberDetail {
    fn from(entry: MemberWithPlan) -> Self {
        let plan = entry.plan_label();
        let member = entry.member;
        Self {
            plan,
            status_label: member.status.label().to_string(),
            payment_label: member.payment_method.label().to_string(),
            qr_image_url: qr_image_url(&member.qr_code),
            available_actions: member.status.available_actions(),
            member,
        }
    }
}

/// Cached record, or the stored one when it is newer than the cache.
async fn get_member(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<String>,
) -> Result<Json<MemberDetail>> {
    state.directory.ensure_loaded().await?;
    if let Some(entry) = state.directory.find(&member_id).await {
        return Ok(Json(entry.into()));
    }

    let member = state
        .db
        .get_member(&member_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Member {} not found", member_id)))?;
    let plan = state
        .db
        .get_plan(&member.plan_id)
        .await?
        .map(|plan| plan.plan_ref());
    state.directory.upsert(member.clone()).await;

    Ok(Json(MemberWithPlan { member, plan }.into()))
}

// ─── Lifecycle Actions ───────────────────────────────────────

#[derive(Deserialize, Default)]
struct ConfirmRequest {
    #[serde(default)]
    confirm: bool,
}

/// Run a lifecycle action after checking the confirmation flag.
async fn run_action(
    state: &AppState,
    admin: &AdminSession,
    member_id: &str,
    action: LifecycleAction,
    body: &[u8],
) -> Result<Json<TransitionOutcome>> {
    let request: ConfirmRequest = serde_json::from_slice(body).unwrap_or_default();
    if !request.confirm {
        return Err(AppError::BadRequest(format!(
            "Action {} requires {{\"confirm\": true}}",
            action
        )));
    }

    let _ticket = state.in_flight.try_acquire(format!("member:{}", member_id))?;
    tracing::info!(
        member_id,
        operation = action.as_str(),
        admin = %admin.email,
        "Lifecycle action requested"
    );

    let outcome = state.lifecycle.apply(member_id, action, Utc::now()).await?;
    Ok(Json(outcome))
}

async fn mark_as_paid(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminSession>,
    Path(member_id): Path<String>,
    body: Bytes,
) -> Result<Json<TransitionOutcome>> {
    run_action(&state, &admin, &member_id, LifecycleAction::MarkAsPaid, &body).await
}

async fn deactivate(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminSession>,
    Path(member_id): Path<String>,
    body: Bytes,
) -> Result<Json<TransitionOutcome>> {
    run_action(&state, &admin, &member_id, LifecycleAction::Deactivate, &body).await
}

async fn reactivate(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminSession>,
    Path(member_id): Path<String>,
    body: Bytes,
) -> Result<Json<TransitionOutcome>> {
    run_action(&state, &admin, &member_id, LifecycleAction::Reactivate, &body).await
}

async fn delete_member(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminSession>,
    Path(member_id): Path<String>,
    body: Bytes,
) -> Result<Json<TransitionOutcome>> {
    run_action(&state, &admin, &member_id, LifecycleAction::Delete, &body).await
}

// ─── Metrics ─────────────────────────────────────────────────

async fn get_metrics(State(state): State<Arc<AppState>>) -> Result<Json<MemberMetrics>> {
    state.directory.ensure_loaded().await?;
    Ok(Json(state.directory.metrics().await))
}

// ─── Leads ───────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeadView {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub goal: LeadGoal,
    pub goal_label: String,
    pub created_at: String,
}

impl From<Lead> for LeadView {
    fn from(lead: Lead) -> Self {
        Self {
            goal_label: lead.goal.label().to_string(),
            created_at: format_utc_rfc3339(lead.created_at),
            id: lead.id,
            name: lead.name,
            phone: lead.phone,
            goal: lead.goal,
        }
    }
}

async fn list_leads(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<LeadFilter>,
) -> Result<Json<Vec<LeadView>>> {
    let leads = leads::list_leads(state.db.as_ref(), &filter).await?;
    Ok(Json(leads.into_iter().map(LeadView::from).collect()))
}

// ─── Settings ────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SettingsBody {
    #[validate(range(min = 1, max = 365))]
    pub expiration_days: u32,
}

async fn get_settings(State(state): State<Arc<AppState>>) -> Json<SettingsBody> {
    Json(SettingsBody {
        expiration_days: settings::expiration_days(state.db.as_ref()).await,
    })
}

async fn update_settings(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminSession>,
    Json(body): Json<SettingsBody>,
) -> Result<Json<SettingsBody>> {
    body.validate().map_err(|_| {
        ValidationError::new(
            "expiration_days",
            format!(
                "Los días de vigencia deben estar entre 1 y {}",
                settings::MAX_EXPIRATION_DAYS
            ),
        )
    })?;

    settings::set_expiration_days(state.db.as_ref(), body.expiration_days).await?;
    tracing::info!(admin = %admin.email, days = body.expiration_days, "Settings updated");
    Ok(Json(body))
}
