use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::ConversionError;

/// Whether a finding fails validation or is only reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

/// A single validation finding with context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Field path the finding refers to
    pub field: String,

    /// Human-readable message
    pub message: String,

    /// Expected type or value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,

    /// Actual value that triggered the finding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn with_actual(mut self, actual: Value) -> Self {
        self.actual = Some(actual);
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}': {}", self.field, self.message)?;
        if let Some(expected) = &self.expected {
            write!(f, " (expected: {})", expected)?;
        }
        Ok(())
    }
}

/// Outcome of validating one payload. Findings are data, not errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,

    /// Model type the payload was validated as
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,

    /// Time taken for validation in milliseconds
    pub validation_time: f64,

    /// Number of fields or rules examined
    pub fields_validated: usize,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            model_type: None,
            validation_time: 0.0,
            fields_validated: 0,
        }
    }

    /// Invalid result carrying a single error
    pub fn invalid(issue: ValidationIssue) -> Self {
        let mut result = Self::new();
        result.add_error(issue);
        result
    }

    /// Result for a payload that could not be converted into its model type
    pub fn from_conversion_error(error: &ConversionError) -> Self {
        let field = error.path().unwrap_or_default();
        Self::invalid(ValidationIssue::new(field, error.to_string()))
    }

    pub fn add_error(&mut self, issue: ValidationIssue) {
        self.errors.push(issue);
        self.is_valid = false;
    }

    pub fn add_warning(&mut self, issue: ValidationIssue) {
        self.warnings.push(issue);
    }

    pub fn add(&mut self, severity: Severity, issue: ValidationIssue) {
        match severity {
            Severity::Error => self.add_error(issue),
            Severity::Warning => self.add_warning(issue),
        }
    }

    /// Fold another result's findings into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.is_valid = self.is_valid && other.is_valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.fields_validated += other.fields_validated;
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}
