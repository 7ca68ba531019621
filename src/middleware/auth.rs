// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Admin session middleware.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::services::AuthSession;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "gymdesk_token";

/// Session lifetime in seconds.
pub const SESSION_TTL_SECS: usize = 12 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (auth provider user id)
    pub sub: String,
    pub email: String,
    /// Server-side session id; the upstream token is looked up by it.
    pub sid: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Signed-in admin, inserted as a request extension.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub user_id: String,
    pub email: String,
    pub session_id: String,
}

/// Session token from the cookie, falling back to the `Authorization` header.
pub fn session_token(jar: &CookieJar, headers: &axum::http::HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Decode and verify a session token.
pub fn verify_jwt(token: &str, signing_key: &[u8]) -> Option<AdminSession> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let claims = decode::<Claims>(token, &key, &validation).ok()?.claims;
    Some(AdminSession {
        user_id: claims.sub,
        email: claims.email,
        session_id: claims.sid,
    })
}

/// Middleware that requires a valid admin session.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = session_token(&jar, request.headers()).ok_or(StatusCode::UNAUTHORIZED)?;
    let session =
        verify_jwt(&token, &state.config.jwt_signing_key).ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

/// Create a JWT for an admin session.
///
/// `session_id` keys the upstream token held in the session store; the token
/// itself never goes into the claims.
pub fn create_jwt(
    session: &AuthSession,
    session_id: &str,
    signing_key: &[u8],
) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: session.user_id.clone(),
        email: session.email.clone(),
        sid: session_id.to_string(),
        iat: now,
        exp: now + SESSION_TTL_SECS,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}
