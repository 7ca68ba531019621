// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! gym-desk API server.
//!
//! Serves member registration, lead capture and the admin back office on
//! top of the hosted database.

use gym_desk::{
    config::{Config, DatastoreKind},
    db::{Datastore, MemoryDb, SupabaseDb},
    services::{AuthProvider, Notifier, StaticAuth, SupabaseAuth},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env()?;
    tracing::info!(port = config.port, datastore = ?config.datastore, "Starting gym-desk API");

    let (db, auth): (Arc<dyn Datastore>, Arc<dyn AuthProvider>) = match config.datastore {
        DatastoreKind::Supabase => (
            Arc::new(SupabaseDb::new(&config.supabase_url, &config.supabase_key)),
            Arc::new(SupabaseAuth::new(
                &config.supabase_url,
                &config.supabase_key,
            )),
        ),
        DatastoreKind::Memory => {
            tracing::warn!("Using in-memory datastore, data is lost on restart");
            let db = MemoryDb::new().with_plans_from_file(&config.plans_file)?;
            let (email, password) = config
                .local_admin
                .clone()
                .ok_or("ADMIN_EMAIL and ADMIN_PASSWORD are required in memory mode")?;
            (Arc::new(db), Arc::new(StaticAuth::new(&email, &password)))
        }
    };

    let notifier = match &config.notify_function_url {
        Some(url) => {
            tracing::info!(url = %url, "Email notifications enabled");
            Notifier::http(url, &config.supabase_key)
        }
        None => Notifier::disabled(),
    };

    let state = Arc::new(AppState::new(config.clone(), db, auth, notifier));

    if let Err(e) = state.directory.refresh().await {
        tracing::warn!(error = %e, "Initial member directory load failed, will retry on demand");
    }

    let app = gym_desk::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("gym_desk=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
