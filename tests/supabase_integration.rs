// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Hosted datastore integration tests.
//!
//! These tests need a disposable project with the `members`, `plans`,
//! `leads` and `settings` tables and a `plan-monthly` plan row.
//! Run with GYM_DESK_TEST_SUPABASE_URL and GYM_DESK_TEST_SUPABASE_KEY set.

mod common;
use common::{hosted_db, seed_member};

use gym_desk::db::Datastore;
use gym_desk::error::AppError;
use gym_desk::models::{MemberPatch, MemberStatus};

/// Document number unlikely to collide between runs.
fn unique_id_number() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{:010}", nanos % 10_000_000_000)
}

#[tokio::test]
async fn test_member_lifecycle_round_trip() {
    require_hosted_backend!();

    let db = hosted_db();
    let member = seed_member(&db, &unique_id_number(), MemberStatus::Pending).await;

    let found = db.find_member_by_cedula(&member.cedula).await.unwrap();
    assert_eq!(found.map(|m| m.id), Some(member.id.clone()));

    let updated = db
        .update_member(
            &member.id,
            &MemberPatch {
                status: Some(MemberStatus::Expired),
                paid_at: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, MemberStatus::Expired);

    let listed = db.list_members().await.unwrap();
    let entry = listed.iter().find(|e| e.member.id == member.id).unwrap();
    assert!(entry.plan.is_some());

    db.delete_member(&member.id).await.unwrap();
    let err = db.delete_member(&member.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_duplicate_cedula_is_conflict() {
    require_hosted_backend!();

    let db = hosted_db();
    let id_number = unique_id_number();
    let member = seed_member(&db, &id_number, MemberStatus::Pending).await;

    let mut duplicate = db.get_member(&member.id).await.unwrap().unwrap();
    duplicate.qr_code.push_str("-DUP");
    let err = db
        .insert_member(&gym_desk::models::NewMember {
            full_name: duplicate.full_name,
            id_type: duplicate.id_type,
            id_number: duplicate.id_number,
            cedula: duplicate.cedula,
            birth_date: duplicate.birth_date,
            age: duplicate.age,
            height_cm: None,
            weight_kg: None,
            profession: None,
            address: None,
            phone: duplicate.phone,
            emergency_phone: duplicate.emergency_phone,
            email: None,
            has_insurance: false,
            allergies: None,
            medical_conditions: None,
            has_biopolymers: false,
            plan_id: duplicate.plan_id,
            payment_method: duplicate.payment_method,
            status: MemberStatus::Pending,
            created_at: duplicate.created_at,
            paid_at: None,
            expires_at: duplicate.expires_at,
            selfie_url: None,
            qr_code: duplicate.qr_code,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    db.delete_member(&member.id).await.unwrap();
}

#[tokio::test]
async fn test_settings_upsert() {
    require_hosted_backend!();

    let db = hosted_db();
    db.set_setting("expiration_days", "7").await.unwrap();
    assert_eq!(
        db.get_setting("expiration_days").await.unwrap().as_deref(),
        Some("7")
    );
}
