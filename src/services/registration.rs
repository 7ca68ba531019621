// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Three-step member registration.
//!
//! [`RegistrationWizard`] is a plain value moving through
//! `Identity -> Contact -> Plan -> Success`. A failed step keeps the wizard
//! where it was, with the captured values, so the user can correct and
//! resubmit. Only the final submission touches the datastore.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::db::Datastore;
use crate::error::{AppError, Result};
use crate::models::member::compose_cedula;
use crate::models::{IdType, Member, MemberStatus, NewMember, PaymentMethod, Plan};
use crate::services::notify::{Notification, Notifier};
use crate::services::qr::{qr_image_url, QrCodeGenerator};
use crate::services::settings;
use crate::validation::{
    compute_age, validate_contact, validate_identity, validate_measurement, ValidationError,
};

pub const DEFAULT_COUNTRY_CODE: &str = "+57";

/// Largest accepted selfie.
pub const MAX_SELFIE_BYTES: usize = 5 * 1024 * 1024;

// ─── Step Inputs ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityStep {
    pub full_name: String,
    pub id_type: IdType,
    pub id_number: String,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactStep {
    #[serde(default = "default_country_code")]
    pub country_code: String,
    pub phone: String,
    pub emergency_phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub has_insurance: bool,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub medical_conditions: Option<String>,
    #[serde(default)]
    pub has_biopolymers: bool,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
}

impl IdentityStep {
    /// Step 1 rules, see [`validate_identity`].
    pub fn validate(&self, today: NaiveDate) -> std::result::Result<(), ValidationError> {
        validate_identity(&self.full_name, &self.id_number, self.birth_date, today)
    }
}

impl ContactStep {
    /// Step 2 rules: both phone numbers, then the optional measurements.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        validate_contact(&self.phone, &self.emergency_phone)?;
        validate_measurement("height_cm", self.height_cm)?;
        validate_measurement("weight_kg", self.weight_kg)
    }
}

fn default_country_code() -> String {
    DEFAULT_COUNTRY_CODE.to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanSelection {
    #[serde(default)]
    pub plan_id: Option<String>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

/// Decoded selfie image.
#[derive(Debug, Clone)]
pub struct SelfieUpload {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl SelfieUpload {
    /// File extension for supported image types.
    fn extension(&self) -> Option<&'static str> {
        match self.content_type.as_str() {
            "image/jpeg" | "image/jpg" => Some("jpg"),
            "image/png" => Some("png"),
            "image/webp" => Some("webp"),
            _ => None,
        }
    }
}

// ─── Wizard State ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Identity,
    Contact,
    Plan,
    Success,
}

/// Why the last attempt on `step` failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardFailure {
    pub step: WizardStep,
    pub field: Option<&'static str>,
    pub reason: String,
}

/// Result of a completed registration.
#[derive(Debug, Clone)]
pub struct RegistrationOutcome {
    pub member: Member,
    pub qr_image_url: String,
    /// Non-fatal problems, e.g. a selfie that could not be stored.
    pub warnings: Vec<String>,
}

/// Services the final submission needs.
#[derive(Clone)]
pub struct RegistrationContext {
    pub db: Arc<dyn Datastore>,
    pub qr: Arc<QrCodeGenerator>,
    pub notifier: Notifier,
    pub selfie_bucket: String,
}

#[derive(Debug, Clone)]
pub struct RegistrationWizard {
    step: WizardStep,
    identity: Option<IdentityStep>,
    contact: Option<ContactStep>,
    selection: PlanSelection,
    selfie: Option<SelfieUpload>,
    failure: Option<WizardFailure>,
    outcome: Option<RegistrationOutcome>,
}

impl Default for RegistrationWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationWizard {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Identity,
            identity: None,
            contact: None,
            selection: PlanSelection::default(),
            selfie: None,
            failure: None,
            outcome: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn failure(&self) -> Option<&WizardFailure> {
        self.failure.as_ref()
    }

    pub fn outcome(&self) -> Option<&RegistrationOutcome> {
        self.outcome.as_ref()
    }

    pub fn identity(&self) -> Option<&IdentityStep> {
        self.identity.as_ref()
    }

    pub fn contact(&self) -> Option<&ContactStep> {
        self.contact.as_ref()
    }

    pub fn selection(&self) -> &PlanSelection {
        &self.selection
    }

    /// Step 1. Advances to `Contact` when the identity rules pass.
    pub fn submit_identity(&mut self, input: IdentityStep, today: NaiveDate) -> Result<()> {
        self.expect_step(WizardStep::Identity)?;

        let result = input.validate(today);
        self.identity = Some(input);
        self.settle(result, WizardStep::Contact)
    }

    /// Step 2. Advances to `Plan` when the contact rules pass.
    pub fn submit_contact(&mut self, input: ContactStep) -> Result<()> {
        self.expect_step(WizardStep::Contact)?;

        let result = input.validate();
        self.contact = Some(input);
        self.settle(result, WizardStep::Plan)
    }

    /// Go back one step. Captured values are kept.
    pub fn back(&mut self) -> WizardStep {
        self.step = match self.step {
            WizardStep::Contact => WizardStep::Identity,
            WizardStep::Plan => WizardStep::Contact,
            other => other,
        };
        self.failure = None;
        self.step
    }

    pub fn select_plan(&mut self, selection: PlanSelection) {
        self.selection = selection;
    }

    pub fn attach_selfie(&mut self, selfie: Option<SelfieUpload>) {
        self.selfie = selfie;
    }

    /// Final step: create the member.
    ///
    /// On failure the wizard stays on `Plan` and may be submitted again; no
    /// member record exists in that case.
    pub async fn submit(
        &mut self,
        ctx: &RegistrationContext,
        now: DateTime<Utc>,
    ) -> Result<RegistrationOutcome> {
        self.expect_step(WizardStep::Plan)?;

        match self.persist(ctx, now).await {
            Ok(outcome) => {
                self.step = WizardStep::Success;
                self.failure = None;
                self.outcome = Some(outcome.clone());
                Ok(outcome)
            }
            Err(e) => {
                let field = match &e {
                    AppError::Validation(v) => Some(v.field),
                    _ => None,
                };
                self.failure = Some(WizardFailure {
                    step: WizardStep::Plan,
                    field,
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn expect_step(&self, expected: WizardStep) -> Result<()> {
        if self.step != expected {
            return Err(AppError::BadRequest(format!(
                "Registration is at step {:?}, not {:?}",
                self.step, expected
            )));
        }
        Ok(())
    }

    fn settle(
        &mut self,
        result: std::result::Result<(), ValidationError>,
        next: WizardStep,
    ) -> Result<()> {
        match result {
            Ok(()) => {
                self.failure = None;
                self.step = next;
                Ok(())
            }
            Err(e) => {
                self.failure = Some(WizardFailure {
                    step: self.step,
                    field: Some(e.field),
                    reason: e.reason.clone(),
                });
                Err(e.into())
            }
        }
    }

    async fn persist(
        &self,
        ctx: &RegistrationContext,
        now: DateTime<Utc>,
    ) -> Result<RegistrationOutcome> {
        let (identity, contact) = match (&self.identity, &self.contact) {
            (Some(identity), Some(contact)) => (identity, contact),
            _ => {
                return Err(AppError::BadRequest(
                    "Identity and contact steps are incomplete".to_string(),
                ))
            }
        };

        let plan_id = self
            .selection
            .plan_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ValidationError::new("plan_id", "Selecciona un plan"))?;
        let payment_method = self
            .selection
            .payment_method
            .ok_or_else(|| ValidationError::new("payment_method", "Selecciona un método de pago"))?;

        let plan = ctx
            .db
            .get_plan(plan_id)
            .await?
            .ok_or_else(|| ValidationError::new("plan_id", "El plan seleccionado no existe"))?;

        let cedula = compose_cedula(identity.id_type, &identity.id_number);
        if ctx.db.find_member_by_cedula(&cedula).await?.is_some() {
            return Err(duplicate_document().into());
        }

        let mut warnings = Vec::new();
        let stored_selfie = match &self.selfie {
            Some(selfie) => {
                match upload_selfie(ctx, &identity.id_number, selfie, now).await {
                    Ok(stored) => Some(stored),
                    Err(warning) => {
                        tracing::warn!(cedula = %cedula, warning = %warning, "Selfie not stored");
                        warnings.push(warning);
                        None
                    }
                }
            }
            None => None,
        };

        let expiration_days = settings::expiration_days(ctx.db.as_ref()).await;
        let expires_at = now
            .checked_add_signed(Duration::days(i64::from(expiration_days)))
            .ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!(
                    "expiry date out of range: {} days",
                    expiration_days
                ))
            })?;
        let qr_code = ctx.qr.generate(now);
        let new_member = build_member(
            identity,
            contact,
            &plan,
            payment_method,
            cedula,
            stored_selfie.as_ref().map(|s| s.url.clone()),
            qr_code,
            now,
            expires_at,
        );

        let member = match ctx.db.insert_member(&new_member).await {
            Ok(member) => member,
            Err(e) => {
                if let Some(stored) = &stored_selfie {
                    discard_selfie(ctx, stored).await;
                }
                return Err(match e {
                    AppError::Conflict(_) => duplicate_document().into(),
                    other => other,
                });
            }
        };

        tracing::info!(
            member_id = %member.id,
            plan = %plan.id,
            expires_at = %member.expires_at,
            "Member registered"
        );

        if let Some(email) = &member.email {
            ctx.notifier.dispatch(Notification::Welcome {
                name: member.full_name.clone(),
                email: email.clone(),
                qr_code: member.qr_code.clone(),
            });
        }
        ctx.notifier.dispatch(Notification::AdminNotification {
            new_member_name: member.full_name.clone(),
            plan: plan.label(),
            email: member.email.clone(),
            phone: member.phone.clone(),
        });

        Ok(RegistrationOutcome {
            qr_image_url: qr_image_url(&member.qr_code),
            member,
            warnings,
        })
    }
}

fn duplicate_document() -> ValidationError {
    ValidationError::new(
        "id_number",
        "Ya existe un miembro registrado con este documento",
    )
}

/// Uploaded selfie object.
struct StoredSelfie {
    name: String,
    url: String,
}

/// Store the selfie, or return a warning for the user.
async fn upload_selfie(
    ctx: &RegistrationContext,
    id_number: &str,
    selfie: &SelfieUpload,
    now: DateTime<Utc>,
) -> std::result::Result<StoredSelfie, String> {
    let extension = selfie
        .extension()
        .ok_or_else(|| format!("Formato de imagen no soportado: {}", selfie.content_type))?;
    if selfie.bytes.is_empty() {
        return Err("La foto está vacía".to_string());
    }
    if selfie.bytes.len() > MAX_SELFIE_BYTES {
        return Err("La foto supera el tamaño máximo de 5 MB".to_string());
    }

    let digits: String = id_number.chars().filter(char::is_ascii_digit).collect();
    let name = format!("{}-{}.{}", digits, now.timestamp_millis(), extension);

    let url = ctx
        .db
        .upload_file(
            &ctx.selfie_bucket,
            &name,
            &selfie.content_type,
            selfie.bytes.clone(),
        )
        .await
        .map_err(|e| format!("No se pudo subir la foto: {}", e))?;
    Ok(StoredSelfie { name, url })
}

/// Remove a selfie whose member row was never written. Best effort.
async fn discard_selfie(ctx: &RegistrationContext, stored: &StoredSelfie) {
    match ctx.db.delete_file(&ctx.selfie_bucket, &stored.name).await {
        Ok(()) => tracing::info!(object = %stored.name, "Discarded selfie of failed registration"),
        Err(e) => tracing::warn!(
            bucket = %ctx.selfie_bucket,
            object = %stored.name,
            error = %e,
            "Orphaned selfie left in storage"
        ),
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[allow(clippy::too_many_arguments)]
fn build_member(
    identity: &IdentityStep,
    contact: &ContactStep,
    plan: &Plan,
    payment_method: PaymentMethod,
    cedula: String,
    selfie_url: Option<String>,
    qr_code: String,
    now: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> NewMember {
    let country_code = contact.country_code.trim();

    NewMember {
        full_name: identity.full_name.trim().to_string(),
        id_type: identity.id_type,
        id_number: identity.id_number.trim().to_string(),
        cedula,
        birth_date: identity.birth_date,
        age: compute_age(identity.birth_date, now.date_naive()),
        height_cm: contact.height_cm,
        weight_kg: contact.weight_kg,
        profession: non_empty(&identity.profession),
        address: non_empty(&identity.address),
        phone: format!("{} {}", country_code, contact.phone.trim()),
        emergency_phone: format!("{} {}", country_code, contact.emergency_phone.trim()),
        email: non_empty(&contact.email),
        has_insurance: contact.has_insurance,
        allergies: non_empty(&contact.allergies),
        medical_conditions: non_empty(&contact.medical_conditions),
        has_biopolymers: contact.has_biopolymers,
        plan_id: plan.id.clone(),
        payment_method,
        status: MemberStatus::Pending,
        created_at: now,
        paid_at: None,
        expires_at,
        selfie_url,
        qr_code,
    }
}
