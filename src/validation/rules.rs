use regex::Regex;
use serde_json::Value;

use super::result::{Severity, ValidationIssue, ValidationResult};
use super::validator::Validator;
use crate::schema::{FieldValue, Record};

/// Constraints applied to one field of a record.
///
/// `required` means "not the zero value". Zero-valued optional fields skip every
/// other constraint, since the converter cannot tell "absent" from "zero".
#[derive(Debug, Clone)]
pub struct FieldRule {
    /// Dot-separated field path (schema names)
    pub field: String,
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    /// Reported when the value matches
    pub forbidden_pattern: Option<Regex>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub allowed: Option<Vec<Value>>,
    pub severity: Severity,
    /// Replaces the generated message for every finding of this rule
    pub message: Option<String>,
}

impl FieldRule {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            required: false,
            min_length: None,
            max_length: None,
            pattern: None,
            forbidden_pattern: None,
            minimum: None,
            maximum: None,
            allowed: None,
            severity: Severity::Error,
            message: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_length_range(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn with_numeric_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.minimum = min;
        self.maximum = max;
        self
    }

    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.pattern = Some(Regex::new(pattern)?);
        Ok(self)
    }

    pub fn with_forbidden_pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.forbidden_pattern = Some(Regex::new(pattern)?);
        Ok(self)
    }

    pub fn with_enum(mut self, values: Vec<Value>) -> Self {
        self.allowed = Some(values);
        self
    }

    /// Report findings as warnings instead of errors
    pub fn as_warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn report(&self, result: &mut ValidationResult, issue: ValidationIssue) {
        let issue = match &self.message {
            Some(message) => ValidationIssue {
                message: message.clone(),
                ..issue
            },
            None => issue,
        };
        result.add(self.severity, issue);
    }

    fn check(&self, record: &Record, result: &mut ValidationResult) {
        let value = match record.lookup(&self.field) {
            Some(value) => value,
            None => {
                // Rules naming unknown fields are a definition bug, always an error
                result.add_error(
                    ValidationIssue::new(&self.field, "Field is not defined by the model schema")
                        .with_expected(record.type_name()),
                );
                return;
            }
        };

        if value.is_zero() {
            if self.required {
                self.report(
                    result,
                    ValidationIssue::new(&self.field, "Required field is missing or empty")
                        .with_expected(format!("non-empty {}", value.kind_name())),
                );
            }
            return;
        }

        self.check_length(value, result);
        self.check_pattern(value, result);
        self.check_range(value, result);
        self.check_enum(value, result);
    }

    fn check_length(&self, value: &FieldValue, result: &mut ValidationResult) {
        let length = match value.len() {
            Some(length) => length,
            None => return,
        };

        if let Some(min_length) = self.min_length {
            if length < min_length {
                self.report(
                    result,
                    ValidationIssue::new(&self.field, format!("Value is too short ({} < {})", length, min_length))
                        .with_expected(format!("minimum length {}", min_length))
                        .with_actual(Value::from(length)),
                );
            }
        }

        if let Some(max_length) = self.max_length {
            if length > max_length {
                self.report(
                    result,
                    ValidationIssue::new(&self.field, format!("Value is too long ({} > {})", length, max_length))
                        .with_expected(format!("maximum length {}", max_length))
                        .with_actual(Value::from(length)),
                );
            }
        }
    }

    fn check_pattern(&self, value: &FieldValue, result: &mut ValidationResult) {
        let text = match value.as_str() {
            Some(text) => text,
            None => return,
        };

        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(text) {
                self.report(
                    result,
                    ValidationIssue::new(&self.field, "String does not match required pattern")
                        .with_expected(format!("pattern {}", pattern.as_str()))
                        .with_actual(Value::String(text.to_string())),
                );
            }
        }

        if let Some(forbidden) = &self.forbidden_pattern {
            if forbidden.is_match(text) {
                self.report(
                    result,
                    ValidationIssue::new(&self.field, "String matches a forbidden pattern")
                        .with_expected(format!("no match for {}", forbidden.as_str()))
                        .with_actual(Value::String(text.to_string())),
                );
            }
        }
    }

    fn check_range(&self, value: &FieldValue, result: &mut ValidationResult) {
        let number = match value {
            FieldValue::Int(_) | FieldValue::UInt(_) | FieldValue::Float(_) => value.as_f64(),
            _ => None,
        };
        let number = match number {
            Some(number) => number,
            None => return,
        };

        if let Some(minimum) = self.minimum {
            if number < minimum {
                self.report(
                    result,
                    ValidationIssue::new(&self.field, format!("Number is too small ({} < {})", number, minimum))
                        .with_expected(format!("minimum {}", minimum))
                        .with_actual(value.to_json()),
                );
            }
        }

        if let Some(maximum) = self.maximum {
            if number > maximum {
                self.report(
                    result,
                    ValidationIssue::new(&self.field, format!("Number is too large ({} > {})", number, maximum))
                        .with_expected(format!("maximum {}", maximum))
                        .with_actual(value.to_json()),
                );
            }
        }
    }

    fn check_enum(&self, value: &FieldValue, result: &mut ValidationResult) {
        if let Some(allowed) = &self.allowed {
            let actual = value.to_json();
            if !allowed.contains(&actual) {
                let expected: Vec<String> = allowed.iter().map(|v| v.to_string()).collect();
                self.report(
                    result,
                    ValidationIssue::new(&self.field, "Value is not in allowed enum list")
                        .with_expected(expected.join(", "))
                        .with_actual(actual),
                );
            }
        }
    }
}

/// Declarative validator: a list of field rules evaluated in order
#[derive(Debug, Clone)]
pub struct RuleValidator {
    name: String,
    rules: Vec<FieldRule>,
}

impl RuleValidator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn add_rule(&mut self, rule: FieldRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }
}

impl Validator for RuleValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, record: &Record) -> ValidationResult {
        let mut result = ValidationResult::new();
        for rule in &self.rules {
            rule.check(record, &mut result);
        }
        result.fields_validated = self.rules.len();
        result
    }
}
