pub mod result;
pub mod rules;
pub mod validator;

pub use result::{Severity, ValidationIssue, ValidationResult};
pub use rules::{FieldRule, RuleValidator};
pub use validator::{FnValidator, FromRecord, Model, TypedValidator, Validator};
