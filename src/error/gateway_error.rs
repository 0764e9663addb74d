use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::{BatchError, ConversionError, ManifestError, RegistryError};

/// Outcome classes surfaced to the request layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayErrorCode {
    NotFound,
    Conflict,
    InvalidInput,
    CapacityExceeded,
    ConfigurationError,
    InternalError,
}

impl GatewayErrorCode {
    /// Returns the string representation of the error code
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayErrorCode::NotFound => "NOT_FOUND",
            GatewayErrorCode::Conflict => "CONFLICT",
            GatewayErrorCode::InvalidInput => "INVALID_INPUT",
            GatewayErrorCode::CapacityExceeded => "CAPACITY_EXCEEDED",
            GatewayErrorCode::ConfigurationError => "CONFIGURATION_ERROR",
            GatewayErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Returns the standard human-readable message for the error code
    pub fn message(&self) -> &'static str {
        match self {
            GatewayErrorCode::NotFound => "Not found",
            GatewayErrorCode::Conflict => "Conflict",
            GatewayErrorCode::InvalidInput => "Invalid input",
            GatewayErrorCode::CapacityExceeded => "Capacity exceeded",
            GatewayErrorCode::ConfigurationError => "Configuration error",
            GatewayErrorCode::InternalError => "Internal error",
        }
    }

    /// HTTP status the request layer should answer with
    pub fn http_status(&self) -> u16 {
        match self {
            GatewayErrorCode::NotFound => 404,
            GatewayErrorCode::Conflict => 409,
            GatewayErrorCode::InvalidInput => 400,
            GatewayErrorCode::CapacityExceeded => 429,
            GatewayErrorCode::ConfigurationError | GatewayErrorCode::InternalError => 500,
        }
    }
}

impl fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl GatewayError {
    pub fn code(&self) -> GatewayErrorCode {
        match self {
            GatewayError::Registry(err) => match err {
                RegistryError::NotFound(_) => GatewayErrorCode::NotFound,
                RegistryError::DuplicateName(_) => GatewayErrorCode::Conflict,
                RegistryError::InvalidName(..) => GatewayErrorCode::InvalidInput,
            },
            GatewayError::Conversion(err) => match err {
                ConversionError::InvalidDestination(_) => GatewayErrorCode::InternalError,
                _ => GatewayErrorCode::InvalidInput,
            },
            GatewayError::Batch(err) => match err {
                BatchError::NotFound(_) => GatewayErrorCode::NotFound,
                BatchError::AlreadyCompleted { .. } | BatchError::AlreadyExists(_) => {
                    GatewayErrorCode::Conflict
                }
                BatchError::CapacityExceeded { .. } => GatewayErrorCode::CapacityExceeded,
                BatchError::InvalidThreshold(_)
                | BatchError::InvalidBatchId(..)
                | BatchError::ModelTypeMismatch { .. } => GatewayErrorCode::InvalidInput,
            },
            GatewayError::Manifest(_) => GatewayErrorCode::InvalidInput,
            GatewayError::Configuration(_) => GatewayErrorCode::ConfigurationError,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == GatewayErrorCode::NotFound
    }

    /// Serializable error body for the request layer
    pub fn to_response(&self) -> ErrorResponse {
        let code = self.code();
        ErrorResponse {
            status: code.http_status(),
            error: code,
            message: self.to_string(),
        }
    }
}

/// Error payload returned to external callers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub status: u16,
    pub error: GatewayErrorCode,
    pub message: String,
}
