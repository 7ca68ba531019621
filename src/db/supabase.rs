// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Hosted backend client: PostgREST for tables, Storage for files.
//!
//! Provides the [`Datastore`] operations for:
//! - Plans (read-only catalog)
//! - Members (registration inserts, lifecycle patches, guarded deletes)
//! - Leads (booking form)
//! - Settings (`expiration_days`)
//! - Selfie uploads

use async_trait::async_trait;
use reqwest::{header, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::db::{tables, Datastore};
use crate::error::AppError;
use crate::models::{Lead, Member, MemberPatch, MemberWithPlan, NewLead, NewMember, Plan};

/// Postgres unique-violation code, surfaced in PostgREST error bodies.
const UNIQUE_VIOLATION: &str = "23505";

/// Postgres invalid-text-representation code, e.g. a malformed uuid filter.
const INVALID_TEXT_REPRESENTATION: &str = "22P02";

/// Embedded plan columns for member listings.
const MEMBER_SELECT: &str = "*,plans(name,duration_type)";

/// REST client for the hosted database and storage.
#[derive(Clone)]
pub struct SupabaseDb {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// PostgREST error body.
#[derive(Debug, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SettingRow {
    value: serde_json::Value,
}

#[derive(Serialize)]
struct SettingUpsert<'a> {
    key: &'a str,
    value: &'a str,
}

impl SupabaseDb {
    /// Create a client for the project at `base_url`.
    pub fn new(base_url: &str, api_key: &str) -> Self {
        tracing::info!(url = base_url, "Configured hosted datastore");
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Public URL of a stored object.
    fn object_url(&self, bucket: &str, name: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            bucket,
            urlencoding::encode(name)
        )
    }

    pub fn public_object_url(&self, bucket: &str, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            bucket,
            urlencoding::encode(name)
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Run a table query and decode the JSON array it returns.
    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, AppError> {
        let response = self
            .request(Method::GET, &self.table_url(table))
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("{} select failed: {}", table, e)))?;

        self.check_response_json(table, response).await
    }

    async fn fetch_one<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, AppError> {
        let rows: Vec<T> = self.fetch_rows(table, query).await?;
        Ok(rows.into_iter().next())
    }

    /// Check response status and return error if not successful.
    async fn check_response(
        &self,
        table: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(failure_to_error(table, status, body))
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: DeserializeOwned>(
        &self,
        table: &str,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        self.check_response(table, response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Storage(format!("{} JSON parse error: {}", table, e)))
    }
}

/// Map a failed PostgREST response onto the error taxonomy.
///
/// A key that cannot even be parsed for its column matches no row, so it is
/// reported as not found rather than as a storage outage.
fn failure_to_error(table: &str, status: StatusCode, body: String) -> AppError {
    let parsed: Option<PostgrestError> = serde_json::from_str(&body).ok();
    let code = parsed.as_ref().and_then(|e| e.code.as_deref());

    if status == StatusCode::CONFLICT || code == Some(UNIQUE_VIOLATION) {
        return AppError::Conflict(format!("{} row already exists", table));
    }

    if status == StatusCode::NOT_FOUND || code == Some(INVALID_TEXT_REPRESENTATION) {
        return AppError::NotFound(format!("{} not found", table));
    }

    let message = parsed.and_then(|e| e.message).unwrap_or(body);
    AppError::Storage(format!(
        "{} request failed: HTTP {}: {}",
        table, status, message
    ))
}

#[async_trait]
impl Datastore for SupabaseDb {
    // ─── Plans ───────────────────────────────────────────────────

    async fn list_plans(&self) -> Result<Vec<Plan>, AppError> {
        self.fetch_rows(
            tables::PLANS,
            &[("select", "*".to_string()), ("order", "price.asc".to_string())],
        )
        .await
    }

    async fn get_plan(&self, plan_id: &str) -> Result<Option<Plan>, AppError> {
        self.fetch_one(
            tables::PLANS,
            &[
                ("select", "*".to_string()),
                ("id", format!("eq.{}", plan_id)),
            ],
        )
        .await
    }

    // ─── Members ─────────────────────────────────────────────────

    async fn list_members(&self) -> Result<Vec<MemberWithPlan>, AppError> {
        self.fetch_rows(
            tables::MEMBERS,
            &[
                ("select", MEMBER_SELECT.to_string()),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    async fn get_member(&self, member_id: &str) -> Result<Option<Member>, AppError> {
        self.fetch_one(
            tables::MEMBERS,
            &[
                ("select", "*".to_string()),
                ("id", format!("eq.{}", member_id)),
            ],
        )
        .await
    }

    async fn find_member_by_cedula(&self, cedula: &str) -> Result<Option<Member>, AppError> {
        self.fetch_one(
            tables::MEMBERS,
            &[
                ("select", "*".to_string()),
                ("cedula", format!("eq.{}", cedula)),
            ],
        )
        .await
    }

    async fn insert_member(&self, member: &NewMember) -> Result<Member, AppError> {
        let response = self
            .request(Method::POST, &self.table_url(tables::MEMBERS))
            .header("Prefer", "return=representation")
            .json(member)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("members insert failed: {}", e)))?;

        let rows: Vec<Member> = self.check_response_json(tables::MEMBERS, response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::Storage("members insert returned no row".to_string()))
    }

    async fn update_member(
        &self,
        member_id: &str,
        patch: &MemberPatch,
    ) -> Result<Member, AppError> {
        let response = self
            .request(Method::PATCH, &self.table_url(tables::MEMBERS))
            .query(&[("id", format!("eq.{}", member_id))])
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("members update failed: {}", e)))?;

        let rows: Vec<Member> = self.check_response_json(tables::MEMBERS, response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", member_id)))
    }

    async fn delete_member(&self, member_id: &str) -> Result<(), AppError> {
        // Ask for the deleted rows back so a missing id is detectable.
        let response = self
            .request(Method::DELETE, &self.table_url(tables::MEMBERS))
            .query(&[("id", format!("eq.{}", member_id))])
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("members delete failed: {}", e)))?;

        let rows: Vec<serde_json::Value> =
            self.check_response_json(tables::MEMBERS, response).await?;
        if rows.is_empty() {
            return Err(AppError::NotFound(format!("Member {} not found", member_id)));
        }
        Ok(())
    }

    // ─── Leads ───────────────────────────────────────────────────

    async fn insert_lead(&self, lead: &NewLead) -> Result<Lead, AppError> {
        let response = self
            .request(Method::POST, &self.table_url(tables::LEADS))
            .header("Prefer", "return=representation")
            .json(lead)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("leads insert failed: {}", e)))?;

        let rows: Vec<Lead> = self.check_response_json(tables::LEADS, response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::Storage("leads insert returned no row".to_string()))
    }

    async fn list_leads(&self) -> Result<Vec<Lead>, AppError> {
        self.fetch_rows(
            tables::LEADS,
            &[
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    // ─── Settings ────────────────────────────────────────────────

    async fn get_setting(&self, key: &str) -> Result<Option<String>, AppError> {
        let row: Option<SettingRow> = self
            .fetch_one(
                tables::SETTINGS,
                &[
                    ("select", "value".to_string()),
                    ("key", format!("eq.{}", key)),
                ],
            )
            .await?;

        // The column is loosely typed: admins have saved both numbers and strings.
        Ok(row.and_then(|r| match r.value {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }))
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<(), AppError> {
        let response = self
            .request(Method::POST, &self.table_url(tables::SETTINGS))
            .query(&[("on_conflict", "key")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&SettingUpsert { key, value })
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("settings upsert failed: {}", e)))?;

        self.check_response(tables::SETTINGS, response).await?;
        Ok(())
    }

    // ─── File storage ────────────────────────────────────────────

    async fn upload_file(
        &self,
        bucket: &str,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AppError> {
        let response = self
            .request(Method::POST, &self.object_url(bucket, name))
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("upload to {} failed: {}", bucket, e)))?;

        self.check_response(bucket, response).await?;

        Ok(self.public_object_url(bucket, name))
    }

    async fn delete_file(&self, bucket: &str, name: &str) -> Result<(), AppError> {
        let response = self
            .request(Method::DELETE, &self.object_url(bucket, name))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("delete from {} failed: {}", bucket, e)))?;

        self.check_response(bucket, response).await?;
        Ok(())
    }
}
