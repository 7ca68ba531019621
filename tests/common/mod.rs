// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

use axum::body::Body;
use axum::http::{header, Request, Response};
use chrono::{Duration, NaiveDate, Utc};
use gym_desk::config::Config;
use gym_desk::db::{Datastore, MemoryDb};
use gym_desk::middleware::auth::create_jwt;
use gym_desk::models::member::compose_cedula;
use gym_desk::models::{IdType, Member, MemberStatus, NewMember, PaymentMethod, Plan};
use gym_desk::routes::create_router;
use gym_desk::services::{AuthSession, Notifier, StaticAuth};
use gym_desk::AppState;
use std::sync::Arc;

pub const ADMIN_EMAIL: &str = "admin@gym.test";
pub const ADMIN_PASSWORD: &str = "secret-pass";

/// Check if a hosted test project is configured.
#[allow(dead_code)]
pub fn hosted_backend_available() -> bool {
    std::env::var("GYM_DESK_TEST_SUPABASE_URL").is_ok()
        && std::env::var("GYM_DESK_TEST_SUPABASE_KEY").is_ok()
}

/// Skip test with message if no hosted project is configured.
#[macro_export]
macro_rules! require_hosted_backend {
    () => {
        if !crate::common::hosted_backend_available() {
            eprintln!("⚠️  Skipping: GYM_DESK_TEST_SUPABASE_URL not set");
            return;
        }
    };
}

/// Client for the hosted test project.
#[allow(dead_code)]
pub fn hosted_db() -> gym_desk::db::SupabaseDb {
    gym_desk::db::SupabaseDb::new(
        &std::env::var("GYM_DESK_TEST_SUPABASE_URL").unwrap(),
        &std::env::var("GYM_DESK_TEST_SUPABASE_KEY").unwrap(),
    )
}

pub fn test_plans() -> Vec<Plan> {
    vec![
        Plan {
            id: "plan-monthly".to_string(),
            name: "Mensual".to_string(),
            duration_type: "mensual".to_string(),
            price: 120_000.0,
            description: None,
            is_active: true,
        },
        Plan {
            id: "plan-legacy".to_string(),
            name: "Anual 2019".to_string(),
            duration_type: "anual".to_string(),
            price: 900_000.0,
            description: None,
            is_active: false,
        },
    ]
}

/// Router, shared state and the backing store, all offline.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub db: MemoryDb,
    pub notifier: Notifier,
}

/// Create a test app with offline dependencies.
pub fn create_test_app() -> TestApp {
    let config = Config::test_default();
    let db = MemoryDb::new().with_plans(test_plans());
    let notifier = Notifier::capture();
    let auth = Arc::new(StaticAuth::new(ADMIN_EMAIL, ADMIN_PASSWORD));

    let state = Arc::new(AppState::new(
        config,
        Arc::new(db.clone()),
        auth,
        notifier.clone(),
    ));

    TestApp {
        router: create_router(state.clone()),
        state,
        db,
        notifier,
    }
}

/// Session token for the test admin.
#[allow(dead_code)]
pub fn admin_token() -> String {
    let session = AuthSession {
        user_id: "local-admin".to_string(),
        email: ADMIN_EMAIL.to_string(),
        access_token: "upstream".to_string(),
    };
    create_jwt(&session, "test-session", &Config::test_default().jwt_signing_key).unwrap()
}

#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[allow(dead_code)]
pub fn admin_request(method: &str, uri: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", admin_token()));

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// A valid full registration body.
#[allow(dead_code)]
pub fn registration_body(id_number: &str) -> serde_json::Value {
    serde_json::json!({
        "identity": {
            "full_name": "Ana Pérez",
            "id_type": "cc",
            "id_number": id_number,
            "birth_date": "1995-03-10",
            "profession": "Diseñadora"
        },
        "contact": {
            "phone": "3001234567",
            "emergency_phone": "3109876543",
            "email": "ana@example.com",
            "has_insurance": true,
            "height_cm": 165,
            "weight_kg": 60
        },
        "plan": {
            "plan_id": "plan-monthly",
            "payment_method": "cash"
        }
    })
}

/// Insert a member directly into the store.
#[allow(dead_code)]
pub async fn seed_member(db: &dyn Datastore, id_number: &str, status: MemberStatus) -> Member {
    let created_at = Utc::now();
    db.insert_member(&NewMember {
        full_name: format!("Socio {}", id_number),
        id_type: IdType::Cc,
        id_number: id_number.to_string(),
        cedula: compose_cedula(IdType::Cc, id_number),
        birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        age: 34,
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
        paid_at: (status == MemberStatus::Active).then_some(created_at),
        expires_at: created_at + Duration::days(7),
        selfie_url: None,
        qr_code: format!("678FIT-{}-{}", created_at.timestamp_millis(), id_number),
    })
    .await
    .unwrap()
}
