use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

fn identifier_regex() -> Result<&'static Regex, String> {
    static IDENTIFIER: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    IDENTIFIER
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_.\-]+$"))
        .as_ref()
        .map_err(|e| e.to_string())
}

/// Identifier helpers for model type names and batch ids
pub struct Identifier;

impl Identifier {
    /// Check a caller-supplied identifier. Returns the reason on failure.
    pub fn validate(value: &str, max_length: usize) -> Result<(), String> {
        if value.is_empty() {
            return Err("identifier cannot be empty".to_string());
        }

        if value.len() > max_length {
            return Err(format!("identifier too long (max {} characters)", max_length));
        }

        // Character set validation (alphanumeric, dots, hyphens, underscores only)
        if !identifier_regex()?.is_match(value) {
            return Err("identifier contains invalid characters".to_string());
        }

        Ok(())
    }

    /// Fresh batch identifier
    pub fn generate() -> String {
        Uuid::new_v4().to_string()
    }
}
