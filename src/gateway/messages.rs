//! Request and response bodies exchanged with the request layer.
//!
//! All keys are snake_case.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::batch::{BatchSession, BatchStatus, BatchVerdict};
use crate::validation::ValidationResult;

/// A payload to validate as `model_type`. `batch_id` carries the batch
/// correlation header when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRequest {
    pub model_type: String,
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
}

impl ValidationRequest {
    pub fn new(model_type: impl Into<String>, payload: Value) -> Self {
        Self {
            model_type: model_type.into(),
            payload,
            batch_id: None,
        }
    }

    pub fn in_batch(mut self, batch_id: impl Into<String>) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ValidationResponse {
    /// Standalone validation
    Result(ValidationResult),
    /// Validation folded into a batch session
    Accumulated(AccumulateResponse),
}

impl ValidationResponse {
    pub fn result(&self) -> &ValidationResult {
        match self {
            ValidationResponse::Result(result) => result,
            ValidationResponse::Accumulated(response) => &response.result,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.result().is_valid
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccumulateStatus {
    Accumulating,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccumulateResponse {
    pub status: AccumulateStatus,
    pub batch_id: String,
    pub is_valid: bool,
    pub total_records: u64,
    pub valid_records: u64,
    pub invalid_records: u64,
    pub warning_count: u64,
    pub result: ValidationResult,
}

impl AccumulateResponse {
    pub(crate) fn new(session: &BatchSession, result: ValidationResult) -> Self {
        Self {
            status: AccumulateStatus::Accumulating,
            batch_id: session.batch_id.clone(),
            is_valid: result.is_valid,
            total_records: session.total_records,
            valid_records: session.valid_records,
            invalid_records: session.invalid_records,
            warning_count: session.warning_count,
            result,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchStartRequest {
    pub model_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
}

impl BatchStartRequest {
    pub fn new(model_type: impl Into<String>) -> Self {
        Self {
            model_type: model_type.into(),
            threshold: None,
            batch_id: None,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_batch_id(mut self, batch_id: impl Into<String>) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchStartResponse {
    pub batch_id: String,
    pub status: BatchStatus,
    pub model_type: String,
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchStatusResponse {
    pub batch_id: String,
    pub total: u64,
    pub valid: u64,
    pub invalid: u64,
    pub warnings: u64,
    pub status: BatchStatus,
    pub success_rate: f64,
    pub threshold: Option<f64>,
}

impl From<BatchSession> for BatchStatusResponse {
    fn from(session: BatchSession) -> Self {
        Self {
            success_rate: session.success_rate(),
            batch_id: session.batch_id,
            total: session.total_records,
            valid: session.valid_records,
            invalid: session.invalid_records,
            warnings: session.warning_count,
            status: session.status,
            threshold: session.threshold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchCompleteResponse {
    pub status: CompletionStatus,
    pub batch_id: String,
    pub success_rate: f64,
    pub threshold: Option<f64>,
    pub total: u64,
    pub valid: u64,
    pub invalid: u64,
}

impl From<BatchVerdict> for BatchCompleteResponse {
    fn from(verdict: BatchVerdict) -> Self {
        Self {
            status: if verdict.passed {
                CompletionStatus::Success
            } else {
                CompletionStatus::Failed
            },
            batch_id: verdict.batch_id,
            success_rate: verdict.success_rate,
            threshold: verdict.threshold,
            total: verdict.total_records,
            valid: verdict.valid_records,
            invalid: verdict.invalid_records,
        }
    }
}
