// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Middleware modules (admin sessions, response headers).

pub mod auth;
pub mod security;

pub use auth::{require_auth, AdminSession};
