// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Sample records for unit tests.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::models::member::{compose_cedula, IdType, MemberStatus, NewMember, PaymentMethod};
use crate::models::plan::Plan;

pub(crate) fn plan(id: &str, name: &str) -> Plan {
    Plan {
        id: id.to_string(),
        name: name.to_string(),
        duration_type: "mensual".to_string(),
        price: 120_000.0,
        description: None,
        is_active: true,
    }
}

pub(crate) fn new_member(
    full_name: &str,
    id_number: &str,
    status: MemberStatus,
    created_at: DateTime<Utc>,
) -> NewMember {
    NewMember {
        full_name: full_name.to_string(),
        id_type: IdType::Cc,
        id_number: id_number.to_string(),
        cedula: compose_cedula(IdType::Cc, id_number),
        birth_date: NaiveDate::from_ymd_opt(1995, 3, 10).unwrap(),
        age: 29,
        height_cm: None,
        weight_kg: None,
        profession: None,
        address: None,
        phone: "+57 3001234567".to_string(),
        emergency_phone: "+57 3109876543".to_string(),
        email: None,
        has_insurance: false,
        allergies: None,
        medical_conditions: None,
        has_biopolymers: false,
        plan_id: "plan-monthly".to_string(),
        payment_method: PaymentMethod::Cash,
        status,
        created_at,
        paid_at: None,
        expires_at: created_at + Duration::days(7),
        selfie_url: None,
        qr_code: format!("678FIT-{}-{}", created_at.timestamp_millis(), id_number),
    }
}
