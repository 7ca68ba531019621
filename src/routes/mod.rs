// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! HTTP route handlers.

pub mod admin;
pub mod auth;
pub mod public;

use crate::config::DatastoreKind;
use crate::middleware::auth::require_auth;
use crate::middleware::security::{add_security_headers, no_store};
use crate::AppState;
use axum::http::{header, Method};
use axum::{extract::State, middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HealthResponse {
    pub status: String,
    pub build_id: String,
    pub datastore: String,
}

/// Health check response
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let build_id = option_env!("BUILD_ID").unwrap_or("unknown").to_string();
    let datastore = match state.config.datastore {
        DatastoreKind::Supabase => "supabase",
        DatastoreKind::Memory => "memory",
    };
    Json(HealthResponse {
        status: "ok".to_string(),
        build_id,
        datastore: datastore.to_string(),
    })
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS layer - allow requests from the front desk site and localhost (for dev)
    let frontend_url = state.config.frontend_url.clone();
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::predicate(
            move |origin: &axum::http::HeaderValue, _request_parts: &axum::http::request::Parts| {
                let origin_str = origin.to_str().unwrap_or("");
                origin_str == frontend_url
                    || origin_str.starts_with("http://localhost")
                    || origin_str.starts_with("http://127.0.0.1")
            },
        ))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    // Public routes (no session required)
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .merge(public::routes())
        .merge(auth::routes().layer(middleware::from_fn(no_store)));

    // Admin routes (session required)
    let admin_routes = admin::routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(middleware::from_fn(no_store));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn(add_security_headers))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
