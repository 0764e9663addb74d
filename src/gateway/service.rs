use log::{debug, info};
use serde_json::Value;
use std::sync::Arc;

use super::dispatch::ValidatorDispatch;
use super::messages::{
    AccumulateResponse, BatchCompleteResponse, BatchStartRequest, BatchStartResponse, BatchStatusResponse,
    ValidationRequest, ValidationResponse,
};
use crate::batch::{BatchSessionManager, SessionOptions};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::registry::ModelRegistry;
use crate::validation::ValidationResult;

/// Entry point for the request layer: validation, optionally folded into batch sessions
pub struct ValidationGateway {
    config: GatewayConfig,
    registry: Arc<ModelRegistry>,
    dispatch: ValidatorDispatch,
    batches: BatchSessionManager,
}

impl ValidationGateway {
    /// Gateway with default configuration and an empty registry
    pub fn new() -> Self {
        let config = GatewayConfig::default();
        let registry = Arc::new(ModelRegistry::with_config(&config));
        Self::assemble(config, registry)
    }

    pub fn with_config(config: GatewayConfig) -> Result<Self, GatewayError> {
        config.validate()?;
        let registry = Arc::new(ModelRegistry::with_config(&config));
        Ok(Self::assemble(config, registry))
    }

    /// Gateway over a registry populated elsewhere
    pub fn with_registry(registry: Arc<ModelRegistry>, config: GatewayConfig) -> Result<Self, GatewayError> {
        config.validate()?;
        Ok(Self::assemble(config, registry))
    }

    fn assemble(config: GatewayConfig, registry: Arc<ModelRegistry>) -> Self {
        Self {
            dispatch: ValidatorDispatch::new(Arc::clone(&registry)),
            batches: BatchSessionManager::with_config(&config),
            registry,
            config,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub fn batches(&self) -> &BatchSessionManager {
        &self.batches
    }

    /// Convert and validate a payload outside any batch
    pub fn validate(&self, model_type: &str, payload: &Value) -> Result<ValidationResult, GatewayError> {
        self.dispatch.validate_payload(model_type, payload)
    }

    /// Validate a request; with a batch id the outcome is recorded in that session.
    ///
    /// Inside a batch a payload that cannot be converted counts as an invalid record.
    pub fn handle_validation(&self, request: ValidationRequest) -> Result<ValidationResponse, GatewayError> {
        let Some(batch_id) = request.batch_id.as_deref() else {
            let result = self.validate(&request.model_type, &request.payload)?;
            return Ok(ValidationResponse::Result(result));
        };

        self.batches.get_session(batch_id)?;
        let result = self.dispatch.validate_or_report(&request.model_type, &request.payload)?;
        let session = self.batches.record_outcome(batch_id, &request.model_type, &result)?;

        debug!(
            "Batch '{}' now at {}/{} valid",
            batch_id, session.valid_records, session.total_records
        );
        Ok(ValidationResponse::Accumulated(AccumulateResponse::new(&session, result)))
    }

    pub fn start_batch(&self, request: BatchStartRequest) -> Result<BatchStartResponse, GatewayError> {
        self.registry.get(&request.model_type)?;

        let options = SessionOptions {
            batch_id: request.batch_id,
            threshold: request.threshold,
            model_type: Some(request.model_type.clone()),
        };
        let session = self.batches.start_session(options)?;

        info!("Batch '{}' opened for model type '{}'", session.batch_id, request.model_type);
        Ok(BatchStartResponse {
            batch_id: session.batch_id,
            status: session.status,
            model_type: request.model_type,
            threshold: session.threshold,
        })
    }

    pub fn batch_status(&self, batch_id: &str) -> Result<BatchStatusResponse, GatewayError> {
        Ok(self.batches.get_session(batch_id)?.into())
    }

    pub fn complete_batch(&self, batch_id: &str) -> Result<BatchCompleteResponse, GatewayError> {
        Ok(self.batches.complete(batch_id)?.into())
    }
}

impl Default for ValidationGateway {
    fn default() -> Self {
        Self::new()
    }
}
