// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Member record, its status enumeration and the lifecycle transition table.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::plan::PlanRef;

/// Kind of identity document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum IdType {
    /// Cédula de ciudadanía
    Cc,
    /// Tarjeta de identidad
    Ti,
    /// Cédula de extranjería
    Ce,
    /// Pasaporte
    Pp,
}

impl IdType {
    pub fn code(self) -> &'static str {
        match self {
            IdType::Cc => "CC",
            IdType::Ti => "TI",
            IdType::Ce => "CE",
            IdType::Pp => "PP",
        }
    }
}

/// Compose the unique document key stored as `cedula`, e.g. `"CC 1234567"`.
pub fn compose_cedula(id_type: IdType, id_number: &str) -> String {
    format!("{} {}", id_type.code(), id_number.trim())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Installments,
}

impl PaymentMethod {
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Contado",
            PaymentMethod::Installments => "Cuotas",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Pending,
    Active,
    Expired,
    Inactive,
}

impl MemberStatus {
    pub const ALL: [MemberStatus; 4] = [
        MemberStatus::Pending,
        MemberStatus::Active,
        MemberStatus::Expired,
        MemberStatus::Inactive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MemberStatus::Pending => "pending",
            MemberStatus::Active => "active",
            MemberStatus::Expired => "expired",
            MemberStatus::Inactive => "inactive",
        }
    }

    /// Display label for the admin screens.
    pub fn label(self) -> &'static str {
        match self {
            MemberStatus::Pending => "Pendiente",
            MemberStatus::Active => "Activo",
            MemberStatus::Expired => "Vencido",
            MemberStatus::Inactive => "Desactivado",
        }
    }

    /// The lifecycle transition table.
    ///
    /// Every (action, status) pair is listed once. Re-issuing an action on a
    /// record already in the action's resulting state is `Stay`, so retries
    /// are harmless. `Delete` has no resulting state; a second delete is
    /// reported by the datastore as not found.
    pub fn apply(self, action: LifecycleAction) -> Result<Transition, GuardViolation> {
        use LifecycleAction::*;
        use MemberStatus::*;

        match (action, self) {
            (MarkAsPaid, Pending | Expired) => Ok(Transition::Move(Active)),
            (MarkAsPaid, Active) => Ok(Transition::Stay),
            (MarkAsPaid, Inactive) => Err(GuardViolation::new(action, self)),

            (Deactivate, Active) => Ok(Transition::Move(Inactive)),
            (Deactivate, Inactive) => Ok(Transition::Stay),
            (Deactivate, Pending | Expired) => Err(GuardViolation::new(action, self)),

            (Reactivate, Inactive) => Ok(Transition::Move(Active)),
            (Reactivate, Active) => Ok(Transition::Stay),
            (Reactivate, Pending | Expired) => Err(GuardViolation::new(action, self)),

            (Delete, Pending | Expired) => Ok(Transition::Remove),
            (Delete, Active | Inactive) => Err(GuardViolation::new(action, self)),
        }
    }

    /// Actions the table accepts from this status, in display order.
    pub fn available_actions(self) -> Vec<LifecycleAction> {
        LifecycleAction::ALL
            .into_iter()
            .filter(|action| {
                matches!(
                    self.apply(*action),
                    Ok(Transition::Move(_)) | Ok(Transition::Remove)
                )
            })
            .collect()
    }
}

impl std::fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admin operations on a persisted member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    MarkAsPaid,
    Deactivate,
    Reactivate,
    Delete,
}

impl LifecycleAction {
    pub const ALL: [LifecycleAction; 4] = [
        LifecycleAction::MarkAsPaid,
        LifecycleAction::Deactivate,
        LifecycleAction::Reactivate,
        LifecycleAction::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleAction::MarkAsPaid => "mark_as_paid",
            LifecycleAction::Deactivate => "deactivate",
            LifecycleAction::Reactivate => "reactivate",
            LifecycleAction::Delete => "delete",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            LifecycleAction::MarkAsPaid => "marcar como pagado",
            LifecycleAction::Deactivate => "desactivar",
            LifecycleAction::Reactivate => "reactivar",
            LifecycleAction::Delete => "eliminar",
        }
    }

    /// Whether a successful move stamps `paid_at`.
    pub fn stamps_payment(self) -> bool {
        matches!(
            self,
            LifecycleAction::MarkAsPaid | LifecycleAction::Reactivate
        )
    }
}

impl std::fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of looking up an (action, status) pair in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Move(MemberStatus),
    Stay,
    Remove,
}

/// Rejected transition. The record is left as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("No se puede {} un miembro en estado {}", .action.verb(), .status.label())]
pub struct GuardViolation {
    pub action: LifecycleAction,
    pub status: MemberStatus,
}

impl GuardViolation {
    pub fn new(action: LifecycleAction, status: MemberStatus) -> Self {
        Self { action, status }
    }
}

/// Member record as stored in the `members` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub full_name: String,
    pub id_type: IdType,
    pub id_number: String,
    /// Unique document key, see [`compose_cedula`].
    pub cedula: String,
    pub birth_date: NaiveDate,
    /// Age in years at registration time.
    pub age: i32,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub profession: Option<String>,
    pub address: Option<String>,
    /// Country code and number, e.g. "+57 3001234567"
    pub phone: String,
    pub emergency_phone: String,
    pub email: Option<String>,
    pub has_insurance: bool,
    pub allergies: Option<String>,
    pub medical_conditions: Option<String>,
    pub has_biopolymers: bool,
    pub plan_id: String,
    pub payment_method: PaymentMethod,
    pub status: MemberStatus,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub selfie_url: Option<String>,
    pub qr_code: String,
}

/// Insert payload for a new member. The datastore assigns `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMember {
    pub full_name: String,
    pub id_type: IdType,
    pub id_number: String,
    pub cedula: String,
    pub birth_date: NaiveDate,
    pub age: i32,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub profession: Option<String>,
    pub address: Option<String>,
    pub phone: String,
    pub emergency_phone: String,
    pub email: Option<String>,
    pub has_insurance: bool,
    pub allergies: Option<String>,
    pub medical_conditions: Option<String>,
    pub has_biopolymers: bool,
    pub plan_id: String,
    pub payment_method: PaymentMethod,
    pub status: MemberStatus,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub selfie_url: Option<String>,
    pub qr_code: String,
}

impl NewMember {
    /// Attach the datastore-assigned id.
    pub fn into_member(self, id: String) -> Member {
        Member {
            id,
            full_name: self.full_name,
            id_type: self.id_type,
            id_number: self.id_number,
            cedula: self.cedula,
            birth_date: self.birth_date,
            age: self.age,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            profession: self.profession,
            address: self.address,
            phone: self.phone,
            emergency_phone: self.emergency_phone,
            email: self.email,
            has_insurance: self.has_insurance,
            allergies: self.allergies,
            medical_conditions: self.medical_conditions,
            has_biopolymers: self.has_biopolymers,
            plan_id: self.plan_id,
            payment_method: self.payment_method,
            status: self.status,
            created_at: self.created_at,
            paid_at: self.paid_at,
            expires_at: self.expires_at,
            selfie_url: self.selfie_url,
            qr_code: self.qr_code,
        }
    }
}

/// Partial update sent by the lifecycle service. Only status and payment
/// time ever change after creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MemberStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
}

impl MemberPatch {
    pub fn apply_to(&self, member: &mut Member) {
        if let Some(status) = self.status {
            member.status = status;
        }
        if let Some(paid_at) = self.paid_at {
            member.paid_at = Some(paid_at);
        }
    }
}

/// Member row joined with its plan's display fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberWithPlan {
    #[serde(flatten)]
    pub member: Member,
    #[serde(default, rename = "plans")]
    pub plan: Option<PlanRef>,
}

impl MemberWithPlan {
    /// "<name> (<duration_type>)", or "-" when the plan is gone.
    pub fn plan_label(&self) -> String {
        self.plan
            .as_ref()
            .map(PlanRef::label)
            .unwrap_or_else(|| "-".to_string())
    }

    /// Date shown in the member list: payment date for active members,
    /// expiry date otherwise.
    pub fn date_info(&self) -> DateTime<Utc> {
        match (self.member.status, self.member.paid_at) {
            (MemberStatus::Active, Some(paid_at)) => paid_at,
            _ => self.member.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_transitions() {
        use LifecycleAction::*;
        use MemberStatus::*;

        assert_eq!(Pending.apply(MarkAsPaid), Ok(Transition::Move(Active)));
        assert_eq!(Expired.apply(MarkAsPaid), Ok(Transition::Move(Active)));
        assert_eq!(Active.apply(Deactivate), Ok(Transition::Move(Inactive)));
        assert_eq!(Inactive.apply(Reactivate), Ok(Transition::Move(Active)));
        assert_eq!(Pending.apply(Delete), Ok(Transition::Remove));
        assert_eq!(Expired.apply(Delete), Ok(Transition::Remove));
    }

    #[test]
    fn test_repeated_actions_are_noops() {
        use LifecycleAction::*;
        use MemberStatus::*;

        assert_eq!(Active.apply(MarkAsPaid), Ok(Transition::Stay));
        assert_eq!(Inactive.apply(Deactivate), Ok(Transition::Stay));
        assert_eq!(Active.apply(Reactivate), Ok(Transition::Stay));
    }

    #[test]
    fn test_guard_table_is_total() {
        use LifecycleAction::*;
        use MemberStatus::*;

        let allowed = [
            (MarkAsPaid, Pending),
            (MarkAsPaid, Expired),
            (MarkAsPaid, Active),
            (Deactivate, Active),
            (Deactivate, Inactive),
            (Reactivate, Inactive),
            (Reactivate, Active),
            (Delete, Pending),
            (Delete, Expired),
        ];

        for action in LifecycleAction::ALL {
            for status in MemberStatus::ALL {
                let result = status.apply(action);
                if allowed.contains(&(action, status)) {
                    assert!(result.is_ok(), "{action} from {status} should pass");
                } else {
                    assert_eq!(
                        result,
                        Err(GuardViolation::new(action, status)),
                        "{action} from {status} should be rejected"
                    );
                }
            }
        }
    }

    #[test]
    fn test_available_actions_match_admin_buttons() {
        use LifecycleAction::*;

        assert_eq!(
            MemberStatus::Pending.available_actions(),
            vec![MarkAsPaid, Delete]
        );
        assert_eq!(MemberStatus::Active.available_actions(), vec![Deactivate]);
        assert_eq!(
            MemberStatus::Expired.available_actions(),
            vec![MarkAsPaid, Delete]
        );
        assert_eq!(MemberStatus::Inactive.available_actions(), vec![Reactivate]);
    }

    #[test]
    fn test_guard_violation_message() {
        let violation = GuardViolation::new(LifecycleAction::Delete, MemberStatus::Active);
        assert_eq!(
            violation.to_string(),
            "No se puede eliminar un miembro en estado Activo"
        );
    }

    #[test]
    fn test_compose_cedula() {
        assert_eq!(compose_cedula(IdType::Cc, " 1234567 "), "CC 1234567");
        assert_eq!(compose_cedula(IdType::Ti, "98765432"), "TI 98765432");
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&MemberStatus::Inactive).unwrap();
        assert_eq!(json, "\"inactive\"");
        let status: MemberStatus = serde_json::from_str("\"expired\"").unwrap();
        assert_eq!(status, MemberStatus::Expired);
    }
}
