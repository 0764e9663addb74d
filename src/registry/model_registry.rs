use log::{debug, info, warn};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::descriptor::{ModelDescriptor, ModelMetadata};
use crate::config::GatewayConfig;
use crate::convert::Converter;
use crate::error::{GatewayError, RegistryError};
use crate::manifest::Manifest;
use crate::schema::{Record, TypeSchema};
use crate::utils::sync;
use crate::utils::Identifier;
use crate::validation::{Model, TypedValidator, ValidationResult, Validator};

#[derive(Default)]
struct RegistryState {
    descriptors: HashMap<String, Arc<ModelDescriptor>>,
    /// Names in registration order
    order: Vec<String>,
}

/// Name → descriptor registry.
///
/// Reads take the shared lock and never block each other; `register` takes the
/// exclusive lock. Descriptors are handed out as `Arc`s, so no lock is held while
/// callers convert or validate.
pub struct ModelRegistry {
    state: RwLock<RegistryState>,
    max_name_length: usize,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::with_config(&GatewayConfig::default())
    }

    pub fn with_config(config: &GatewayConfig) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            max_name_length: config.max_model_name_length,
        }
    }

    /// Bind `name` to a schema and validator.
    ///
    /// Registering the same name again with an identical schema is a no-op that
    /// returns the existing descriptor; a different schema is rejected and the
    /// existing entry is left untouched.
    pub fn register(
        &self,
        name: &str,
        schema: impl Into<Arc<TypeSchema>>,
        validator: Arc<dyn Validator>,
        metadata: ModelMetadata,
    ) -> Result<Arc<ModelDescriptor>, RegistryError> {
        self.validate_name(name)?;
        let schema = schema.into();

        let mut state = sync::write(&self.state);
        if let Some(existing) = Self::existing_entry(&state, name, &schema)? {
            return Ok(existing);
        }
        Ok(Self::insert(&mut state, name, schema, validator, metadata))
    }

    /// Register a statically typed model with a validator over the typed value
    pub fn register_model<M, F>(
        &self,
        name: &str,
        validate: F,
        metadata: ModelMetadata,
    ) -> Result<Arc<ModelDescriptor>, RegistryError>
    where
        M: Model,
        F: Fn(&M) -> ValidationResult + Send + Sync + 'static,
    {
        let validator = TypedValidator::<M, F>::new(name, validate);
        self.register(name, M::schema(), Arc::new(validator), metadata)
    }

    /// Register every model of a manifest, in manifest order.
    ///
    /// Either every model is registered or none is: definitions are built and
    /// checked against the current entries under one write lock before the
    /// first insert.
    pub fn register_manifest(&self, manifest: &Manifest) -> Result<Vec<Arc<ModelDescriptor>>, GatewayError> {
        let definitions = manifest.definitions()?;
        for definition in &definitions {
            self.validate_name(&definition.name)?;
        }

        let mut state = sync::write(&self.state);

        let mut pending = Vec::with_capacity(definitions.len());
        for definition in definitions {
            let schema = Arc::new(definition.schema);
            let existing = Self::existing_entry(&state, &definition.name, &schema)?;
            pending.push((definition.name, schema, definition.validator, definition.metadata, existing));
        }

        let registered: Vec<_> = pending
            .into_iter()
            .map(|(name, schema, validator, metadata, existing)| match existing {
                Some(descriptor) => descriptor,
                None => Self::insert(&mut state, &name, schema, Arc::new(validator), metadata),
            })
            .collect();

        info!("Registered {} model types from manifest {}", registered.len(), manifest.version);
        Ok(registered)
    }

    fn validate_name(&self, name: &str) -> Result<(), RegistryError> {
        Identifier::validate(name, self.max_name_length)
            .map_err(|reason| RegistryError::InvalidName(name.to_string(), reason))
    }

    /// `Some` when `name` is already bound to an identical schema
    fn existing_entry(
        state: &RegistryState,
        name: &str,
        schema: &Arc<TypeSchema>,
    ) -> Result<Option<Arc<ModelDescriptor>>, RegistryError> {
        match state.descriptors.get(name) {
            Some(existing) if existing.schema() == schema => {
                debug!("Model type '{}' already registered with identical schema", name);
                Ok(Some(Arc::clone(existing)))
            }
            Some(_) => {
                warn!("Rejected re-registration of model type '{}' with a different schema", name);
                Err(RegistryError::DuplicateName(name.to_string()))
            }
            None => Ok(None),
        }
    }

    fn insert(
        state: &mut RegistryState,
        name: &str,
        schema: Arc<TypeSchema>,
        validator: Arc<dyn Validator>,
        metadata: ModelMetadata,
    ) -> Arc<ModelDescriptor> {
        let descriptor = Arc::new(ModelDescriptor::new(name.to_string(), schema, validator, metadata));
        state.descriptors.insert(name.to_string(), Arc::clone(&descriptor));
        state.order.push(name.to_string());

        info!(
            "Registered model type '{}' (schema '{}', validator '{}')",
            name,
            descriptor.schema().name(),
            descriptor.validator().name()
        );
        descriptor
    }

    pub fn get(&self, name: &str) -> Result<Arc<ModelDescriptor>, RegistryError> {
        sync::read(&self.state)
            .descriptors
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn is_registered(&self, name: &str) -> bool {
        sync::read(&self.state).descriptors.contains_key(name)
    }

    /// All descriptors in registration order
    pub fn list_all(&self) -> Vec<Arc<ModelDescriptor>> {
        let state = sync::read(&self.state);
        state
            .order
            .iter()
            .filter_map(|name| state.descriptors.get(name).cloned())
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        sync::read(&self.state).order.clone()
    }

    pub fn len(&self) -> usize {
        sync::read(&self.state).descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fresh zero-valued instance of a model type; the registry keeps no reference to it
    pub fn create_instance(&self, name: &str) -> Result<Record, RegistryError> {
        Ok(self.get(name)?.create_instance())
    }

    pub fn get_validator(&self, name: &str) -> Result<Arc<dyn Validator>, RegistryError> {
        Ok(Arc::clone(self.get(name)?.validator()))
    }

    /// Instantiate a model type and populate it from untyped data
    pub fn convert(&self, name: &str, data: &Value) -> Result<Record, GatewayError> {
        let mut record = self.create_instance(name)?;
        Converter::populate_record(&mut record, data)?;
        Ok(record)
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldKind, IntWidth};
    use crate::validation::RuleValidator;
    use serde_json::json;

    fn schema(value_kind: FieldKind) -> TypeSchema {
        TypeSchema::new("ticket")
            .with_field("id", FieldKind::String)
            .with_field("value", value_kind)
    }

    fn validator() -> Arc<dyn Validator> {
        Arc::new(RuleValidator::new("ticket"))
    }

    #[test]
    fn test_register_and_get() {
        let registry = ModelRegistry::new();
        registry
            .register("ticket", schema(FieldKind::Int(IntWidth::W64)), validator(), ModelMetadata::new("Ticket", "1.0"))
            .unwrap();

        let descriptor = registry.get("ticket").unwrap();
        assert_eq!(descriptor.name(), "ticket");
        assert_eq!(descriptor.metadata().display_name, "Ticket");
        assert!(registry.is_registered("ticket"));
        assert!(!registry.is_registered("other"));
        assert_eq!(registry.get("other").unwrap_err(), RegistryError::NotFound("other".to_string()));
    }

    #[test]
    fn test_idempotent_registration() {
        let registry = ModelRegistry::new();
        let first = registry
            .register("ticket", schema(FieldKind::Int(IntWidth::W64)), validator(), ModelMetadata::default())
            .unwrap();
        let second = registry
            .register("ticket", schema(FieldKind::Int(IntWidth::W64)), validator(), ModelMetadata::default())
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_name_with_different_schema() {
        let registry = ModelRegistry::new();
        registry
            .register("ticket", schema(FieldKind::Int(IntWidth::W64)), validator(), ModelMetadata::default())
            .unwrap();

        let err = registry
            .register("ticket", schema(FieldKind::String), validator(), ModelMetadata::default())
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("ticket".to_string()));

        let kept = registry.get("ticket").unwrap();
        assert_eq!(kept.schema().get_field("value").unwrap().kind, FieldKind::Int(IntWidth::W64));
    }

    #[test]
    fn test_invalid_names_rejected() {
        let registry = ModelRegistry::new();
        for name in ["", "has space", "slash/name"] {
            let err = registry
                .register(name, schema(FieldKind::String), validator(), ModelMetadata::default())
                .unwrap_err();
            assert!(matches!(err, RegistryError::InvalidName(..)), "{:?}", name);
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_list_all_preserves_insertion_order() {
        let registry = ModelRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry
                .register(name, TypeSchema::new(name), validator(), ModelMetadata::default())
                .unwrap();
        }

        let names: Vec<String> = registry.list_all().iter().map(|d| d.name().to_string()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(registry.names(), names);
    }

    #[test]
    fn test_create_instance_is_fresh() {
        let registry = ModelRegistry::new();
        registry
            .register("ticket", schema(FieldKind::Int(IntWidth::W64)), validator(), ModelMetadata::default())
            .unwrap();

        let populated = registry.convert("ticket", &json!({"id": "T1", "value": 9})).unwrap();
        assert_eq!(populated.get_i64("value"), Some(9));

        let fresh = registry.create_instance("ticket").unwrap();
        assert_eq!(fresh.get_i64("value"), Some(0));
        assert!(registry.create_instance("missing").is_err());
    }

    #[test]
    fn test_get_validator() {
        let registry = ModelRegistry::new();
        registry
            .register("ticket", schema(FieldKind::String), validator(), ModelMetadata::default())
            .unwrap();

        assert_eq!(registry.get_validator("ticket").unwrap().name(), "ticket");
        assert!(matches!(registry.get_validator("nope"), Err(RegistryError::NotFound(_))));
    }
}
