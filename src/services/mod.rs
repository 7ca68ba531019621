// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Services module - business logic layer.

pub mod auth;
pub mod directory;
pub mod inflight;
pub mod leads;
pub mod lifecycle;
pub mod notify;
pub mod qr;
pub mod registration;
pub mod sessions;
pub mod settings;

pub use auth::{AuthError, AuthProvider, AuthSession, StaticAuth, SupabaseAuth};
pub use directory::{MemberDirectory, MemberFilter};
pub use inflight::{InFlightGuard, InFlightTicket};
pub use leads::{LeadFilter, LeadRequest};
pub use lifecycle::{LifecycleService, TransitionOutcome};
pub use notify::{Notification, Notifier};
pub use qr::QrCodeGenerator;
pub use sessions::SessionStore;
pub use registration::{
    ContactStep, IdentityStep, PlanSelection, RegistrationContext, RegistrationOutcome,
    RegistrationWizard, SelfieUpload, WizardStep,
};
