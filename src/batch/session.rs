use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a batch session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Active,
    Completed,
    Failed,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Active => "active",
            BatchStatus::Completed => "completed",
            BatchStatus::Failed => "failed",
        }
    }

    /// Completed and Failed are final; no further accumulation is accepted
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BatchStatus::Active)
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Options for starting a batch session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Caller-chosen id; a UUID is generated when absent
    pub batch_id: Option<String>,
    /// Minimum success rate, as a percentage, for the batch to pass
    pub threshold: Option<f64>,
    pub model_type: Option<String>,
}

impl SessionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch_id(mut self, batch_id: impl Into<String>) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_model_type(mut self, model_type: impl Into<String>) -> Self {
        self.model_type = Some(model_type.into());
        self
    }
}

/// Accumulated validation statistics of one batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSession {
    pub batch_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    pub total_records: u64,
    pub valid_records: u64,
    pub invalid_records: u64,
    pub warning_count: u64,
    pub status: BatchStatus,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl BatchSession {
    pub(crate) fn new(batch_id: String, model_type: Option<String>, threshold: Option<f64>) -> Self {
        let now = Utc::now();
        Self {
            batch_id,
            model_type,
            threshold,
            total_records: 0,
            valid_records: 0,
            invalid_records: 0,
            warning_count: 0,
            status: BatchStatus::Active,
            created_at: now,
            last_updated_at: now,
            completed_at: None,
        }
    }

    /// Percentage of valid records; 0 for an empty batch
    pub fn success_rate(&self) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        self.valid_records as f64 / self.total_records as f64 * 100.0
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Total grows by exactly valid + invalid, keeping the counters balanced.
    pub(crate) fn record(&mut self, valid: u64, invalid: u64, warnings: u64) {
        self.valid_records = self.valid_records.saturating_add(valid);
        self.invalid_records = self.invalid_records.saturating_add(invalid);
        self.total_records = self.valid_records.saturating_add(self.invalid_records);
        self.warning_count = self.warning_count.saturating_add(warnings);
        self.last_updated_at = Utc::now();
    }

    /// Resolve the batch against its threshold and move it to a terminal state
    pub(crate) fn finalize(&mut self) -> BatchVerdict {
        let success_rate = self.success_rate();
        let passed = match self.threshold {
            Some(threshold) => success_rate >= threshold,
            None => true,
        };

        let now = Utc::now();
        self.status = if passed {
            BatchStatus::Completed
        } else {
            BatchStatus::Failed
        };
        self.completed_at = Some(now);
        self.last_updated_at = now;

        BatchVerdict {
            batch_id: self.batch_id.clone(),
            status: self.status,
            passed,
            success_rate,
            threshold: self.threshold,
            total_records: self.total_records,
            valid_records: self.valid_records,
            invalid_records: self.invalid_records,
            warning_count: self.warning_count,
        }
    }
}

/// Final outcome of a completed batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchVerdict {
    pub batch_id: String,
    pub status: BatchStatus,
    pub passed: bool,
    pub success_rate: f64,
    pub threshold: Option<f64>,
    pub total_records: u64,
    pub valid_records: u64,
    pub invalid_records: u64,
    pub warning_count: u64,
}
