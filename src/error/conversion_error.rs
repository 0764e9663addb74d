use thiserror::Error;

/// Failure while populating a typed record from untyped data.
///
/// `path` locates the offending value using external keys, e.g. `author.name`,
/// `items[3]` or `labels["env"]`. The empty path denotes the payload root.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("Type mismatch at '{path}': expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("Numeric overflow at '{path}': {value} does not fit in {target}")]
    Overflow {
        path: String,
        value: String,
        target: String,
    },

    #[error("Invalid map key '{key}' at '{path}': expected {expected}")]
    InvalidKey {
        path: String,
        key: String,
        expected: String,
    },

    #[error("Cannot decode value at '{path}' as {target}: {reason}")]
    Reencode {
        path: String,
        target: String,
        reason: String,
    },

    #[error("Invalid conversion destination: expected a struct, got {0}")]
    InvalidDestination(String),
}

impl ConversionError {
    /// Location of the failure, or `None` for destination errors
    pub fn path(&self) -> Option<&str> {
        match self {
            ConversionError::TypeMismatch { path, .. }
            | ConversionError::Overflow { path, .. }
            | ConversionError::InvalidKey { path, .. }
            | ConversionError::Reencode { path, .. } => Some(path),
            ConversionError::InvalidDestination(_) => None,
        }
    }
}
