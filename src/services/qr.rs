// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Member QR tokens.
//!
//! Only the token string is produced here. Rendering it into an image is
//! left to an external endpoint, see [`qr_image_url`].

use chrono::{DateTime, Utc};
use rand::distributions::{Distribution, Uniform};
use std::collections::HashSet;
use std::sync::Mutex;

const RANDOM_SUFFIX_LEN: usize = 6;
const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const QR_RENDER_ENDPOINT: &str = "https://api.qrserver.com/v1/create-qr-code/";

/// Generates `PREFIX-<epoch millis>-<random>` tokens.
///
/// Tokens handed out within the same millisecond are remembered so that two
/// registrations at the same instant never share a token.
pub struct QrCodeGenerator {
    prefix: String,
    issued: Mutex<IssuedInMillisecond>,
}

#[derive(Default)]
struct IssuedInMillisecond {
    millis: i64,
    suffixes: HashSet<String>,
}

impl QrCodeGenerator {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.trim().to_uppercase(),
            issued: Mutex::new(IssuedInMillisecond::default()),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Generate a fresh token for a registration happening at `now`.
    pub fn generate(&self, now: DateTime<Utc>) -> String {
        let millis = now.timestamp_millis();
        let mut issued = self
            .issued
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if issued.millis != millis {
            issued.millis = millis;
            issued.suffixes.clear();
        }

        let suffix = loop {
            let candidate = random_suffix();
            if issued.suffixes.insert(candidate.clone()) {
                break candidate;
            }
        };

        format!("{}-{}-{}", self.prefix, millis, suffix).to_uppercase()
    }
}

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    let index = Uniform::from(0..SUFFIX_ALPHABET.len());
    (0..RANDOM_SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[index.sample(&mut rng)] as char)
        .collect()
}

/// URL of a 150x150 rendering of `code`.
pub fn qr_image_url(code: &str) -> String {
    format!(
        "{}?size=150x150&data={}",
        QR_RENDER_ENDPOINT,
        urlencoding::encode(code)
    )
}
