//! Regras de validação dos documentos de usuário e de consulta.
//!
//! Each check appends a [`FieldViolation`] instead of returning early, so callers can
//! report every problem at once or keep only the first one.

use chrono::{DateTime, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::models::Gender;
use crate::utils::AppError;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^\d{10}$").unwrap();
    static ref NIC_RE: Regex = Regex::new(r"^\d{3}$").unwrap();
}

pub const NAME_MIN_LEN: usize = 3;
pub const PASSWORD_MIN_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Acumula violações na ordem em que os campos são declarados.
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldViolation {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<FieldViolation> {
        self.0
    }

    /// Returns the trimmed value, or records "`label` is required!" when absent or blank.
    pub fn required<'a>(&mut self, field: &str, label: &str, value: Option<&'a str>) -> Option<&'a str> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Some(v),
            _ => {
                self.push(field, format!("{} is required!", label));
                None
            }
        }
    }

    pub fn name(&mut self, field: &str, label: &str, value: Option<&str>) -> Option<String> {
        let v = self.required(field, label, value)?;
        if v.chars().count() < NAME_MIN_LEN {
            self.push(
                field,
                format!("{} must contain at least {} characters!", label, NAME_MIN_LEN),
            );
            return None;
        }
        Some(v.to_string())
    }

    pub fn email(&mut self, value: Option<&str>) -> Option<String> {
        let v = self.required("email", "Email", value)?;
        if !is_valid_email(v) {
            self.push("email", "Please provide a valid email address!");
            return None;
        }
        Some(v.to_lowercase())
    }

    pub fn phone(&mut self, value: Option<&str>) -> Option<String> {
        let v = self.required("phone", "Phone number", value)?;
        if !PHONE_RE.is_match(v) {
            self.push("phone", "Phone number must contain exactly 10 digits!");
            return None;
        }
        Some(v.to_string())
    }

    pub fn nic(&mut self, value: Option<&str>) -> Option<String> {
        let v = self.required("nic", "NIC", value)?;
        if !NIC_RE.is_match(v) {
            self.push("nic", "NIC must contain exactly 3 digits!");
            return None;
        }
        Some(v.to_string())
    }

    pub fn dob(&mut self, value: Option<&str>) -> Option<NaiveDate> {
        let v = self.required("dob", "Date of birth", value)?;
        match parse_date(v) {
            Some(date) => Some(date),
            None => {
                self.push("dob", "Date of birth must be a valid date (YYYY-MM-DD)!");
                None
            }
        }
    }

    pub fn gender(&mut self, value: Option<&str>) -> Option<Gender> {
        let v = self.required("gender", "Gender", value)?;
        match v.parse::<Gender>() {
            Ok(g) => Some(g),
            Err(_) => {
                self.push("gender", "Gender must be either Male or Female!");
                None
            }
        }
    }

    pub fn password(&mut self, value: Option<&str>) -> Option<String> {
        // Senha não é "trimada": espaços fazem parte do segredo
        let v = match value {
            Some(v) if !v.is_empty() => v,
            _ => {
                self.push("password", "Password is required!");
                return None;
            }
        };
        if v.chars().count() < PASSWORD_MIN_LEN {
            self.push(
                "password",
                format!("Password must contain at least {} characters!", PASSWORD_MIN_LEN),
            );
            return None;
        }
        Some(v.to_string())
    }
}

impl From<FieldViolation> for AppError {
    fn from(v: FieldViolation) -> Self {
        AppError::Validation {
            field: v.field,
            message: v.message,
        }
    }
}

/// The store reports only the first violated constraint
pub fn first_error(violations: Vec<FieldViolation>) -> AppError {
    violations
        .into_iter()
        .next()
        .map(AppError::from)
        .unwrap_or_else(|| AppError::validation("body", "Invalid request"))
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Accepts a plain `YYYY-MM-DD` date or an RFC 3339 timestamp.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}
