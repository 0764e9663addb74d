use log::debug;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

use crate::convert::Converter;
use crate::error::{GatewayError, RegistryError};
use crate::registry::ModelRegistry;
use crate::schema::Record;
use crate::validation::ValidationResult;

/// Resolves the validator bound to a model type and runs it
#[derive(Clone)]
pub struct ValidatorDispatch {
    registry: Arc<ModelRegistry>,
}

impl ValidatorDispatch {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    /// Validate an already converted record
    pub fn validate_record(&self, model_type: &str, record: &Record) -> Result<ValidationResult, RegistryError> {
        let validator = self.registry.get_validator(model_type)?;

        let started = Instant::now();
        let mut result = validator.validate(record);
        result.validation_time = started.elapsed().as_secs_f64() * 1000.0;
        result.model_type = Some(model_type.to_string());
        if result.fields_validated == 0 {
            result.fields_validated = record.schema().len();
        }

        debug!(
            "Validated '{}' with '{}': {} errors, {} warnings in {:.3}ms",
            model_type,
            validator.name(),
            result.errors.len(),
            result.warnings.len(),
            result.validation_time
        );
        Ok(result)
    }

    /// Convert and validate a payload; conversion failures are returned as errors
    pub fn validate_payload(&self, model_type: &str, payload: &Value) -> Result<ValidationResult, GatewayError> {
        let record = self.registry.convert(model_type, payload)?;
        Ok(self.validate_record(model_type, &record)?)
    }

    /// Convert and validate a payload; a conversion failure becomes an invalid result
    pub fn validate_or_report(&self, model_type: &str, payload: &Value) -> Result<ValidationResult, RegistryError> {
        let mut record = self.registry.create_instance(model_type)?;
        if let Err(e) = Converter::populate_record(&mut record, payload) {
            let mut result = ValidationResult::from_conversion_error(&e);
            result.model_type = Some(model_type.to_string());
            return Ok(result);
        }
        self.validate_record(model_type, &record)
    }
}
