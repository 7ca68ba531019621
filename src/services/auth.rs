// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Admin sign-in against the hosted auth service (GoTrue).

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

/// Result of a successful password sign-in.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: String,
    pub email: String,
    /// Upstream access token, needed for sign-out.
    pub access_token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Credenciales incorrectas")]
    InvalidCredentials,

    #[error("Auth provider error: {0}")]
    Provider(String),
}

/// Identity provider for admin accounts.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError>;

    /// Revoke the upstream session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
}

/// GoTrue client.
#[derive(Clone)]
pub struct SupabaseAuth {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl SupabaseAuth {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let url = format!("{}/auth/v1/token", self.base_url);
        let response = self
            .http
            .post(&url)
            .query(&[("grant_type", "password")])
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AuthError::Provider(format!("Sign-in request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            tracing::info!(email, "Admin sign-in rejected");
            return Err(AuthError::InvalidCredentials);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Auth provider sign-in failed");
            return Err(AuthError::Provider(format!(
                "Sign-in failed with status {}",
                status
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Provider(format!("Failed to parse token response: {}", e)))?;

        Ok(AuthSession {
            user_id: token.user.id,
            email: token.user.email.unwrap_or_else(|| email.to_string()),
            access_token: token.access_token,
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let url = format!("{}/auth/v1/logout", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::Provider(format!("Sign-out request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AuthError::Provider(format!(
                "Sign-out failed with status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Single fixed admin account, for memory mode.
pub struct StaticAuth {
    email: String,
    password: String,
}

impl StaticAuth {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }
}

#[async_trait]
impl AuthProvider for StaticAuth {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        if !email.eq_ignore_ascii_case(&self.email) || password != self.password {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(AuthSession {
            user_id: "local-admin".to_string(),
            email: self.email.clone(),
            access_token: uuid::Uuid::new_v4().to_string(),
        })
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), AuthError> {
        Ok(())
    }
}
