// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! gym-desk: front desk back office for a fitness studio.
//!
//! Member registration, the member status lifecycle, lead capture and the
//! admin API, backed by a hosted PostgREST/Storage project.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;
pub mod validation;

use config::Config;
use db::Datastore;
use services::{
    AuthProvider, InFlightGuard, LifecycleService, MemberDirectory, Notifier, QrCodeGenerator,
    RegistrationContext, SessionStore,
};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn Datastore>,
    pub auth: Arc<dyn AuthProvider>,
    pub notifier: Notifier,
    pub directory: Arc<MemberDirectory>,
    pub lifecycle: LifecycleService,
    pub registration: RegistrationContext,
    pub in_flight: InFlightGuard,
    pub sessions: SessionStore,
}

impl AppState {
    /// Wire the services around one datastore.
    pub fn new(
        config: Config,
        db: Arc<dyn Datastore>,
        auth: Arc<dyn AuthProvider>,
        notifier: Notifier,
    ) -> Self {
        let directory = Arc::new(MemberDirectory::new(db.clone()));
        let lifecycle = LifecycleService::new(db.clone(), directory.clone());
        let registration = RegistrationContext {
            db: db.clone(),
            qr: Arc::new(QrCodeGenerator::new(&config.qr_prefix)),
            notifier: notifier.clone(),
            selfie_bucket: config.selfie_bucket.clone(),
        };

        Self {
            config,
            db,
            auth,
            notifier,
            directory,
            lifecycle,
            registration,
            in_flight: InFlightGuard::new(),
            sessions: SessionStore::new(),
        }
    }
}
