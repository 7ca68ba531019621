// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Admin member list, lifecycle actions, metrics and settings.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{admin_request, body_json, create_test_app, json_request, registration_body, seed_member};
use gym_desk::db::Datastore;
use gym_desk::models::MemberStatus;
use tower::ServiceExt;

#[tokio::test]
async fn test_admin_routes_require_session() {
    let app = create_test_app();

    for uri in ["/admin/members", "/admin/metrics", "/admin/leads", "/admin/settings"] {
        let response = app
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/admin/members")
                .header("Authorization", "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_member_list_filters_and_labels() {
    let app = create_test_app();
    seed_member(&app.db, "1000001", MemberStatus::Pending).await;
    seed_member(&app.db, "1000002", MemberStatus::Active).await;
    seed_member(&app.db, "2000003", MemberStatus::Inactive).await;

    let response = app
        .router
        .clone()
        .oneshot(admin_request("GET", "/admin/members", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");
    let body = body_json(response).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r["plan"] == "Mensual (mensual)"));

    let response = app
        .router
        .clone()
        .oneshot(admin_request("GET", "/admin/members?search=cc%201000", None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);

    let response = app
        .router
        .oneshot(admin_request("GET", "/admin/members?status=inactive", None))
        .await
        .unwrap();
    let body = body_json(response).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["status_label"], "Desactivado");
    assert_eq!(rows[0]["available_actions"], serde_json::json!(["reactivate"]));
}

#[tokio::test]
async fn test_refresh_picks_up_new_rows() {
    let app = create_test_app();
    seed_member(&app.db, "1000001", MemberStatus::Pending).await;

    let response = app
        .router
        .clone()
        .oneshot(admin_request("GET", "/admin/members", None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    seed_member(&app.db, "1000002", MemberStatus::Pending).await;

    let response = app
        .router
        .clone()
        .oneshot(admin_request("GET", "/admin/members", None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    let response = app
        .router
        .oneshot(admin_request("GET", "/admin/members?refresh=true", None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_registration_visible_to_admin() {
    let app = create_test_app();
    app.state.directory.refresh().await.unwrap();

    let response = app
        .router
        .clone()
        .oneshot(json_request("POST", "/api/registration", registration_body("1234567")))
        .await
        .unwrap();
    let member_id = body_json(response).await["member_id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .router
        .oneshot(admin_request("GET", &format!("/admin/members/{}", member_id), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["cedula"], "CC 1234567");
    assert_eq!(body["status_label"], "Pendiente");
    assert_eq!(body["payment_label"], "Contado");
    assert_eq!(body["plan"], "Mensual (mensual)");
    assert_eq!(
        body["available_actions"],
        serde_json::json!(["mark_as_paid", "delete"])
    );
}

#[tokio::test]
async fn test_unknown_member_is_not_found() {
    let app = create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(admin_request("GET", "/admin/members/missing", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .router
        .oneshot(admin_request(
            "POST",
            "/admin/members/missing/pay",
            Some(serde_json::json!({"confirm": true})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_actions_require_confirmation() {
    let app = create_test_app();
    let member = seed_member(&app.db, "1000001", MemberStatus::Pending).await;
    let uri = format!("/admin/members/{}/pay", member.id);

    for body in [None, Some(serde_json::json!({})), Some(serde_json::json!({"confirm": false}))] {
        let response = app
            .router
            .clone()
            .oneshot(admin_request("POST", &uri, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let stored = app.db.get_member(&member.id).await.unwrap().unwrap();
    assert_eq!(stored.status, MemberStatus::Pending);
}

#[tokio::test]
async fn test_pay_deactivate_reactivate_cycle() {
    let app = create_test_app();
    let member = seed_member(&app.db, "1000001", MemberStatus::Pending).await;
    let confirm = Some(serde_json::json!({"confirm": true}));

    let response = app
        .router
        .clone()
        .oneshot(admin_request(
            "POST",
            &format!("/admin/members/{}/pay", member.id),
            confirm.clone(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["previous"], "pending");
    assert_eq!(body["current"], "active");
    assert_eq!(body["changed"], true);
    let stored = app.db.get_member(&member.id).await.unwrap().unwrap();
    assert!(stored.paid_at.is_some());

    // Paying again is a harmless no-op.
    let response = app
        .router
        .clone()
        .oneshot(admin_request(
            "POST",
            &format!("/admin/members/{}/pay", member.id),
            confirm.clone(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["changed"], false);

    let response = app
        .router
        .clone()
        .oneshot(admin_request(
            "POST",
            &format!("/admin/members/{}/deactivate", member.id),
            confirm.clone(),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["current"], "inactive");

    let response = app
        .router
        .oneshot(admin_request(
            "POST",
            &format!("/admin/members/{}/reactivate", member.id),
            confirm,
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["current"], "active");
}

#[tokio::test]
async fn test_guard_violation_is_conflict() {
    let app = create_test_app();
    let member = seed_member(&app.db, "1000001", MemberStatus::Active).await;

    let response = app
        .router
        .oneshot(admin_request(
            "DELETE",
            &format!("/admin/members/{}", member.id),
            Some(serde_json::json!({"confirm": true})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"], "guard_violation");
    assert_eq!(
        body["details"],
        "No se puede eliminar un miembro en estado Activo"
    );
    assert!(app.db.get_member(&member.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_expired_member() {
    let app = create_test_app();
    let member = seed_member(&app.db, "1000001", MemberStatus::Expired).await;
    let uri = format!("/admin/members/{}", member.id);
    let confirm = Some(serde_json::json!({"confirm": true}));

    let response = app
        .router
        .clone()
        .oneshot(admin_request("DELETE", &uri, confirm.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["current"].is_null());
    assert!(app.db.get_member(&member.id).await.unwrap().is_none());

    let response = app
        .router
        .oneshot(admin_request("DELETE", &uri, confirm))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_concurrent_action_on_same_member_rejected() {
    let app = create_test_app();
    let member = seed_member(&app.db, "1000001", MemberStatus::Pending).await;
    let _ticket = app
        .state
        .in_flight
        .try_acquire(format!("member:{}", member.id))
        .unwrap();

    let response = app
        .router
        .oneshot(admin_request(
            "POST",
            &format!("/admin/members/{}/pay", member.id),
            Some(serde_json::json!({"confirm": true})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let stored = app.db.get_member(&member.id).await.unwrap().unwrap();
    assert_eq!(stored.status, MemberStatus::Pending);
}

#[tokio::test]
async fn test_metrics_bucket_expired_and_inactive() {
    let app = create_test_app();
    seed_member(&app.db, "1000001", MemberStatus::Pending).await;
    seed_member(&app.db, "1000002", MemberStatus::Active).await;
    seed_member(&app.db, "1000003", MemberStatus::Expired).await;
    seed_member(&app.db, "1000004", MemberStatus::Inactive).await;

    let response = app
        .router
        .oneshot(admin_request("GET", "/admin/metrics", None))
        .await
        .unwrap();

    assert_eq!(
        body_json(response).await,
        serde_json::json!({"total": 4, "pending": 1, "active": 1, "expired_or_inactive": 2})
    );
}

#[tokio::test]
async fn test_settings_round_trip() {
    let app = create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(admin_request("GET", "/admin/settings", None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["expiration_days"], 7);

    let response = app
        .router
        .clone()
        .oneshot(admin_request(
            "PUT",
            "/admin/settings",
            Some(serde_json::json!({"expiration_days": 400})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["field"], "expiration_days");

    let response = app
        .router
        .clone()
        .oneshot(admin_request(
            "PUT",
            "/admin/settings",
            Some(serde_json::json!({"expiration_days": 30})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .clone()
        .oneshot(json_request("POST", "/api/registration", registration_body("1234567")))
        .await
        .unwrap();
    let member_id = body_json(response).await["member_id"]
        .as_str()
        .unwrap()
        .to_string();
    let member = app.db.get_member(&member_id).await.unwrap().unwrap();
    assert_eq!(member.expires_at - member.created_at, chrono::Duration::days(30));
}
