// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Admin sign-in routes.

use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::{
    create_jwt, session_token, verify_jwt, SESSION_COOKIE, SESSION_TTL_SECS,
};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(session))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionResponse {
    pub email: String,
    /// Also set as an HttpOnly cookie; returned for non-browser clients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Password sign-in; issues the session cookie.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let email = request.email.trim();
    if email.is_empty() || request.password.is_empty() {
        return Err(AppError::InvalidCredentials);
    }

    let session = state
        .auth
        .sign_in_with_password(email, &request.password)
        .await?;

    let session_id = state.sessions.open(
        &session.access_token,
        Utc::now(),
        Duration::seconds(SESSION_TTL_SECS as i64),
    );
    let token = create_jwt(&session, &session_id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    tracing::info!(email = %session.email, "Admin signed in");

    let secure = state.config.frontend_url.starts_with("https://");
    Ok((
        jar.add(session_cookie(token.clone(), secure)),
        Json(SessionResponse {
            email: session.email,
            token: Some(token),
        }),
    ))
}

/// Clear the session. Upstream sign-out is best effort.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> (CookieJar, Json<LogoutResponse>) {
    let admin = session_token(&jar, &headers)
        .and_then(|token| verify_jwt(&token, &state.config.jwt_signing_key));

    if let Some(admin) = admin {
        match state.sessions.close(&admin.session_id, Utc::now()) {
            Some(access_token) => match state.auth.sign_out(&access_token).await {
                Ok(()) => tracing::info!(email = %admin.email, "Admin signed out"),
                Err(e) => {
                    tracing::warn!(email = %admin.email, error = %e, "Upstream sign-out failed")
                }
            },
            None => tracing::info!(email = %admin.email, "Admin signed out, no upstream session"),
        }
    }

    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Json(LogoutResponse { success: true }),
    )
}

/// Current admin, or 401.
async fn session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>> {
    let token = session_token(&jar, &headers).ok_or(AppError::Unauthorized)?;
    let admin =
        verify_jwt(&token, &state.config.jwt_signing_key).ok_or(AppError::InvalidToken)?;

    Ok(Json(SessionResponse {
        email: admin.email,
        token: None,
    }))
}
