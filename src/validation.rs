// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Field rules for the registration form.
//!
//! Every check here is pure: no datastore access, and "today" is always passed
//! in by the caller so results are reproducible.

use chrono::{Datelike, NaiveDate};
use std::ops::RangeInclusive;

/// Youngest age accepted at registration.
pub const MINIMUM_AGE: i32 = 14;

const ID_NUMBER_DIGITS: RangeInclusive<usize> = 6..=10;
const PHONE_DIGITS: RangeInclusive<usize> = 10..=11;

/// ASCII digits only, with a length inside `len`.
fn is_digits(value: &str, len: &RangeInclusive<usize>) -> bool {
    len.contains(&value.len()) && value.bytes().all(|b| b.is_ascii_digit())
}

/// A rule failure: which field and a message fit for the end user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Whole years elapsed between `birth_date` and `today`.
///
/// The year difference is reduced by one while this year's birthday has not
/// been reached yet.
pub fn compute_age(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

/// Step 1 rules: name and document present, document is 6-10 digits,
/// applicant is at least [`MINIMUM_AGE`].
pub fn validate_identity(
    full_name: &str,
    id_number: &str,
    birth_date: NaiveDate,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    if full_name.trim().is_empty() {
        return Err(ValidationError::new(
            "full_name",
            "El nombre completo es obligatorio",
        ));
    }

    let id_number = id_number.trim();
    if id_number.is_empty() {
        return Err(ValidationError::new(
            "id_number",
            "El número de documento es obligatorio",
        ));
    }
    if !is_digits(id_number, &ID_NUMBER_DIGITS) {
        return Err(ValidationError::new(
            "id_number",
            "El número de documento debe tener entre 6 y 10 dígitos",
        ));
    }

    let age = compute_age(birth_date, today);
    if age < MINIMUM_AGE {
        return Err(ValidationError::new(
            "birth_date",
            format!("Debes tener al menos {MINIMUM_AGE} años para inscribirte"),
        ));
    }

    Ok(())
}

/// Step 2 rules: both numbers present and 10-11 digits.
///
/// The country code travels separately and is not checked here.
pub fn validate_contact(phone: &str, emergency_phone: &str) -> Result<(), ValidationError> {
    validate_phone("phone", phone, "El teléfono")?;
    validate_phone(
        "emergency_phone",
        emergency_phone,
        "El teléfono de emergencia",
    )
}

/// Single phone number check, shared with the lead form.
pub fn validate_phone(
    field: &'static str,
    value: &str,
    label: &str,
) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::new(field, format!("{label} es obligatorio")));
    }
    if !is_digits(value, &PHONE_DIGITS) {
        return Err(ValidationError::new(
            field,
            format!("{label} debe tener entre 10 y 11 dígitos"),
        ));
    }
    Ok(())
}

/// Optional body measurement: absent is fine, present must be a positive number.
pub fn validate_measurement(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.is_finite() || v <= 0.0 => Err(ValidationError::new(
            field,
            "El valor debe ser un número positivo",
        )),
        _ => Ok(()),
    }
}
