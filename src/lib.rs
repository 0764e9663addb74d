//! # Validation Gateway
//!
//! Accepts JSON payloads tagged with a model type name, converts them into typed
//! records, validates them, and aggregates outcomes across multi-request batches
//! with pass/fail thresholds.
//!
//! ## Features
//!
//! - **Model Registry**: runtime name → {schema, validator} bindings with idempotent registration
//! - **Typed Conversion**: range-checked conversion of untyped JSON into schema-described records
//! - **Batch Sessions**: concurrent accumulation with a threshold verdict and deferred cleanup
//! - **Manifests**: JSON/YAML model definitions with declarative field rules
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use serde_json::json;
//! use validation_gateway::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let gateway = ValidationGateway::new();
//!
//!     let schema = TypeSchema::new("ticket")
//!         .with_field("id", FieldKind::String)
//!         .with_field("value", FieldKind::Int(IntWidth::W64));
//!     let rules = RuleValidator::new("ticket").with_rule(FieldRule::new("id").required());
//!     gateway
//!         .registry()
//!         .register("ticket", schema, Arc::new(rules), ModelMetadata::new("Ticket", "1.0"))?;
//!
//!     let batch = gateway.start_batch(BatchStartRequest::new("ticket").with_threshold(75.0))?;
//!     let request = ValidationRequest::new("ticket", json!({"id": "T1", "value": 42}))
//!         .in_batch(&batch.batch_id);
//!     gateway.handle_validation(request)?;
//!
//!     let verdict = gateway.complete_batch(&batch.batch_id)?;
//!     println!("{:?} at {:.1}%", verdict.status, verdict.success_rate);
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod config;
pub mod convert;
pub mod error;
pub mod gateway;
pub mod manifest;
pub mod registry;
pub mod schema;
pub mod utils;
pub mod validation;

pub use batch::{BatchSession, BatchSessionManager, BatchStatus, BatchVerdict, SessionOptions};
pub use config::GatewayConfig;
pub use convert::Converter;
pub use error::{
    BatchError, ConversionError, ErrorResponse, GatewayError, GatewayErrorCode, ManifestError, RegistryError, Result,
};
pub use gateway::{
    AccumulateResponse, BatchCompleteResponse, BatchStartRequest, BatchStartResponse, BatchStatusResponse,
    CompletionStatus, ValidationGateway, ValidationRequest, ValidationResponse, ValidatorDispatch,
};
pub use manifest::{Manifest, ManifestParser, ModelManifest};
pub use registry::{ModelDescriptor, ModelMetadata, ModelRegistry, ModelSummary};
pub use schema::{FieldKind, FieldSchema, FieldValue, FloatWidth, IntWidth, MapKey, Record, TypeSchema};
pub use validation::{
    FieldRule, FnValidator, FromRecord, Model, RuleValidator, Severity, TypedValidator, ValidationIssue,
    ValidationResult, Validator,
};

/// Prelude module for convenient importing
pub mod prelude {
    pub use crate::{
        BatchSessionManager, BatchStartRequest, BatchStatus, FieldKind, FieldRule, FieldSchema, FieldValue,
        FnValidator, FromRecord, GatewayConfig, GatewayError, IntWidth, Model, ModelMetadata, ModelRegistry, Record,
        Result, RuleValidator, SessionOptions, TypeSchema, ValidationGateway, ValidationIssue, ValidationRequest,
        ValidationResult, Validator,
    };
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
