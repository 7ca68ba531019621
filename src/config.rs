// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Application configuration loaded from environment variables.

use std::env;

/// Which datastore backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatastoreKind {
    /// Hosted PostgREST/Storage project.
    Supabase,
    /// Process-local tables, lost on restart.
    Memory,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the hosted project, e.g. `https://abc.supabase.co`
    pub supabase_url: String,
    /// Project API key, sent to every backend service.
    pub supabase_key: String,
    /// JWT signing key for admin session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    pub port: u16,
    /// Allowed CORS origin.
    pub frontend_url: String,
    /// Email function endpoint. `None` disables notifications.
    pub notify_function_url: Option<String>,
    pub selfie_bucket: String,
    pub qr_prefix: String,
    pub datastore: DatastoreKind,
    /// Plan catalog loaded in memory mode.
    pub plans_file: String,
    /// Admin account accepted in memory mode, `(email, password)`.
    pub local_admin: Option<(String, String)>,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    ///
    /// With `DATASTORE=memory` the hosted project is optional and the admin
    /// account comes from `ADMIN_EMAIL` / `ADMIN_PASSWORD` instead.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let datastore = match env::var("DATASTORE").ok().as_deref().map(str::trim) {
            None | Some("") | Some("supabase") => DatastoreKind::Supabase,
            Some("memory") => DatastoreKind::Memory,
            Some(other) => return Err(ConfigError::Invalid("DATASTORE", other.to_string())),
        };

        let (supabase_url, supabase_key, local_admin) = match datastore {
            DatastoreKind::Supabase => (
                required("SUPABASE_URL")?.trim_end_matches('/').to_string(),
                required("SUPABASE_KEY")?,
                None,
            ),
            DatastoreKind::Memory => (
                optional("SUPABASE_URL").unwrap_or_default(),
                optional("SUPABASE_KEY").unwrap_or_default(),
                Some((required("ADMIN_EMAIL")?, required("ADMIN_PASSWORD")?)),
            ),
        };

        let notify_function_url = optional("NOTIFY_FUNCTION_URL").or_else(|| {
            (!supabase_url.is_empty())
                .then(|| format!("{}/functions/v1/send-email", supabase_url))
        });

        let port = match optional("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", raw))?,
            None => 8080,
        };

        Ok(Self {
            jwt_signing_key: required("JWT_SIGNING_KEY")?.into_bytes(),
            port,
            frontend_url: optional("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:5173".to_string()),
            notify_function_url,
            selfie_bucket: optional("SELFIE_BUCKET").unwrap_or_else(|| "selfies".to_string()),
            qr_prefix: optional("QR_PREFIX").unwrap_or_else(|| "678FIT".to_string()),
            supabase_url,
            supabase_key,
            datastore,
            local_admin,
            plans_file: optional("PLANS_FILE").unwrap_or_else(|| "data/plans.json".to_string()),
        })
    }

    /// In-memory configuration for tests.
    pub fn test_default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_key: String::new(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            notify_function_url: None,
            selfie_bucket: "selfies".to_string(),
            qr_prefix: "678FIT".to_string(),
            datastore: DatastoreKind::Memory,
            plans_file: "data/plans.json".to_string(),
            local_admin: Some(("admin@gym.test".to_string(), "secret-pass".to_string())),
        }
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("SUPABASE_URL", "https://abc.supabase.co/");
        env::set_var("SUPABASE_KEY", "anon-key");
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::remove_var("DATASTORE");
        env::remove_var("PORT");
        env::remove_var("NOTIFY_FUNCTION_URL");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.datastore, DatastoreKind::Supabase);
        assert_eq!(config.supabase_url, "https://abc.supabase.co");
        assert_eq!(config.port, 8080);
        assert_eq!(config.selfie_bucket, "selfies");
        assert_eq!(
            config.notify_function_url.as_deref(),
            Some("https://abc.supabase.co/functions/v1/send-email")
        );
    }
}
