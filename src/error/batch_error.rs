use crate::batch::BatchStatus;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BatchError {
    #[error("Batch session not found: {0}")]
    NotFound(String),

    #[error("Batch session '{batch_id}' is already {status}")]
    AlreadyCompleted { batch_id: String, status: BatchStatus },

    #[error("Batch session already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid threshold {0}: must be a percentage between 0 and 100")]
    InvalidThreshold(f64),

    #[error("Invalid batch id '{0}': {1}")]
    InvalidBatchId(String, String),

    #[error("Too many active batch sessions: maximum {max} allowed")]
    CapacityExceeded { max: usize },

    #[error("Batch session '{batch_id}' expects model type '{expected}', got '{actual}'")]
    ModelTypeMismatch {
        batch_id: String,
        expected: String,
        actual: String,
    },
}
