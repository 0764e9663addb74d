use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::schema::{Record, TypeSchema};
use crate::validation::Validator;

/// Descriptive metadata attached to a registered model type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub display_name: String,
    pub version: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ModelMetadata {
    pub fn new(display_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            version: version.into(),
            tags: Vec::new(),
            description: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self::new("", "1.0.0")
    }
}

/// Registry record binding a model type name to its schema and validator
pub struct ModelDescriptor {
    name: String,
    schema: Arc<TypeSchema>,
    validator: Arc<dyn Validator>,
    metadata: ModelMetadata,
}

impl ModelDescriptor {
    pub(crate) fn new(
        name: String,
        schema: Arc<TypeSchema>,
        validator: Arc<dyn Validator>,
        metadata: ModelMetadata,
    ) -> Self {
        Self {
            name,
            schema,
            validator,
            metadata,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Arc<TypeSchema> {
        &self.schema
    }

    pub fn validator(&self) -> &Arc<dyn Validator> {
        &self.validator
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Zero-valued instance of this model's schema
    pub fn create_instance(&self) -> Record {
        Record::zeroed(Arc::clone(&self.schema))
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            name: self.name.clone(),
            display_name: self.metadata.display_name.clone(),
            version: self.metadata.version.clone(),
            tags: self.metadata.tags.clone(),
            description: self.metadata.description.clone(),
            validator: self.validator.name().to_string(),
            created_at: self.metadata.created_at,
            schema: self.schema.describe(),
        }
    }
}

impl fmt::Debug for ModelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelDescriptor")
            .field("name", &self.name)
            .field("schema", &self.schema.name())
            .field("validator", &self.validator.name())
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// Serializable view of a descriptor for model listings
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub name: String,
    pub display_name: String,
    pub version: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub validator: String,
    pub created_at: DateTime<Utc>,
    pub schema: Value,
}
