// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Public routes: plan catalog, member registration and the lead form.

use crate::error::Result;
use crate::models::member::compose_cedula;
use crate::models::{Lead, Plan};
use crate::services::leads::{self, LeadRequest};
use crate::services::registration::{
    ContactStep, IdentityStep, PlanSelection, RegistrationWizard, SelfieUpload, WizardStep,
};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/plans", get(list_plans))
        .route("/api/registration/identity", post(check_identity))
        .route("/api/registration/contact", post(check_contact))
        .route("/api/registration", post(register))
        .route("/api/leads", post(submit_lead))
}

// ─── Plans ───────────────────────────────────────────────────

/// Active plans, cheapest first.
async fn list_plans(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Plan>>> {
    let plans = state.db.list_plans().await?;
    Ok(Json(plans.into_iter().filter(|p| p.is_active).collect()))
}

// ─── Registration ────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StepResponse {
    pub next_step: WizardStep,
}

async fn check_identity(Json(input): Json<IdentityStep>) -> Result<Json<StepResponse>> {
    input.validate(Utc::now().date_naive())?;
    Ok(Json(StepResponse {
        next_step: WizardStep::Contact,
    }))
}

async fn check_contact(Json(input): Json<ContactStep>) -> Result<Json<StepResponse>> {
    input.validate()?;
    Ok(Json(StepResponse {
        next_step: WizardStep::Plan,
    }))
}

/// Selfie as sent by the browser: base64, optionally as a data URL.
#[derive(Deserialize)]
pub struct SelfiePayload {
    content_type: String,
    data: String,
}

impl SelfiePayload {
    fn decode(self) -> std::result::Result<SelfieUpload, String> {
        let encoded = match self.data.split_once(',') {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest,
            _ => self.data.as_str(),
        };
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| "La foto no se pudo leer".to_string())?;
        Ok(SelfieUpload {
            content_type: self.content_type.trim().to_lowercase(),
            bytes,
        })
    }
}

#[derive(Deserialize)]
pub struct RegistrationRequest {
    identity: IdentityStep,
    contact: ContactStep,
    #[serde(default)]
    plan: PlanSelection,
    #[serde(default)]
    selfie: Option<SelfiePayload>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RegistrationResponse {
    pub member_id: String,
    pub qr_code: String,
    pub qr_image_url: String,
    pub expires_at: String,
    pub warnings: Vec<String>,
}

/// Run all three steps and create the member.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegistrationRequest>,
) -> Result<(StatusCode, Json<RegistrationResponse>)> {
    let now = Utc::now();
    let cedula = compose_cedula(request.identity.id_type, &request.identity.id_number);
    let _ticket = state.in_flight.try_acquire(format!("cedula:{}", cedula))?;

    let mut wizard = RegistrationWizard::new();
    wizard.submit_identity(request.identity, now.date_naive())?;
    wizard.submit_contact(request.contact)?;
    wizard.select_plan(request.plan);

    let mut warnings = Vec::new();
    match request.selfie.map(SelfiePayload::decode) {
        Some(Ok(selfie)) => wizard.attach_selfie(Some(selfie)),
        Some(Err(warning)) => warnings.push(warning),
        None => {}
    }

    let outcome = wizard.submit(&state.registration, now).await?;
    state.directory.upsert(outcome.member.clone()).await;
    warnings.extend(outcome.warnings);

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            member_id: outcome.member.id,
            qr_code: outcome.member.qr_code,
            qr_image_url: outcome.qr_image_url,
            expires_at: format_utc_rfc3339(outcome.member.expires_at),
            warnings,
        }),
    ))
}

// ─── Leads ───────────────────────────────────────────────────

async fn submit_lead(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LeadRequest>,
) -> Result<(StatusCode, Json<Lead>)> {
    let lead = leads::submit_lead(state.db.as_ref(), &state.notifier, request, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(lead)))
}
