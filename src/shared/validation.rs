//! Validation utilities module
//!
//! This module provides common validation functionality used across the application.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single failing field and the rule codes it violated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub codes: Vec<String>,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, code: impl Into<String>) -> Self {
        Self { field: field.into(), codes: vec![code.into()] }
    }
}

/// Every failing field of a rejected input, sorted by field name
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationFailure {
    fields: Vec<FieldViolation>,
}

impl ValidationFailure {
    pub fn new(mut fields: Vec<FieldViolation>) -> Self {
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        Self { fields }
    }

    pub fn single(field: impl Into<String>, code: impl Into<String>) -> Self {
        Self::new(vec![FieldViolation::new(field, code)])
    }

    pub fn fields(&self) -> &[FieldViolation] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.field.as_str()).collect()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid fields: {}", self.field_names().join(", "))
    }
}

impl From<&validator::ValidationErrors> for ValidationFailure {
    fn from(errors: &validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let mut codes: Vec<String> = errs.iter().map(|e| e.code.to_string()).collect();
                codes.sort();
                codes.dedup();
                FieldViolation { field: field.to_string(), codes }
            })
            .collect();
        ValidationFailure::new(fields)
    }
}

/// Serde helpers that turn mistyped body fields into values the validator reports,
/// instead of failing the whole body
pub mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Strings pass through; any other JSON type becomes empty and fails its length rule
    pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => s,
            _ => String::new(),
        })
    }

    /// Accept `500`, `500.5` or `"500"`; anything else becomes `None` and fails validation
    pub fn amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }
}

/// Validation utilities for the application
pub struct ValidationUtils;

impl ValidationUtils {
    /// Longest identifier accepted from the gateway or from callback payloads
    pub const MAX_IDENTIFIER_LEN: usize = 255;

    /// Check a gateway-issued identifier taken from a path or callback body.
    ///
    /// Only rejects values that could never have been issued (empty, oversized,
    /// control or whitespace characters); it does not guess the gateway's format.
    pub fn is_plausible_identifier(value: &str) -> bool {
        !value.is_empty()
            && value.len() <= Self::MAX_IDENTIFIER_LEN
            && value.chars().all(|c| c.is_ascii_graphic())
    }

    /// Reject whitespace-only text that passed a plain length rule
    pub fn validate_not_blank(value: &str) -> Result<(), validator::ValidationError> {
        if value.trim().is_empty() {
            return Err(validator::ValidationError::new("blank"));
        }
        Ok(())
    }
}
