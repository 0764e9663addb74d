use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::error::ManifestError;
use crate::registry::ModelMetadata;
use crate::schema::{FieldKind, FieldSchema, FloatWidth, IntWidth, TypeSchema};
use crate::validation::{FieldRule, RuleValidator, Severity};

/// Declarative description of a set of model types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    #[serde(default)]
    pub models: Vec<ModelManifest>,
}

/// Everything needed to register one model type
#[derive(Debug, Clone)]
pub struct ModelDefinition {
    pub name: String,
    pub schema: TypeSchema,
    pub validator: RuleValidator,
    pub metadata: ModelMetadata,
}

impl Manifest {
    pub fn get_model(&self, name: &str) -> Option<&ModelManifest> {
        self.models.iter().find(|model| model.name == name)
    }

    /// Build every model definition, failing on the first malformed one.
    ///
    /// A model name may appear only once per manifest.
    pub fn definitions(&self) -> Result<Vec<ModelDefinition>, ManifestError> {
        let mut seen = HashSet::with_capacity(self.models.len());
        for model in &self.models {
            if !seen.insert(model.name.as_str()) {
                return Err(ManifestError::DuplicateModel(model.name.clone()));
            }
        }
        self.models.iter().map(ModelManifest::to_definition).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelManifest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub fields: Vec<FieldManifest>,
}

impl ModelManifest {
    pub fn to_schema(&self) -> Result<TypeSchema, ManifestError> {
        build_schema(&self.name, &self.fields)
    }

    /// Rule validator over every field carrying rules; nested fields use dotted paths
    pub fn to_validator(&self) -> Result<RuleValidator, ManifestError> {
        let mut validator = RuleValidator::new(self.name.clone());
        collect_rules(&self.fields, "", &mut validator)?;
        Ok(validator)
    }

    pub fn to_metadata(&self) -> ModelMetadata {
        let display_name = self.display_name.clone().unwrap_or_else(|| self.name.clone());
        let version = self.version.clone().unwrap_or_else(|| "1.0.0".to_string());
        let metadata = ModelMetadata::new(display_name, version).with_tags(self.tags.iter().cloned());
        match &self.description {
            Some(description) => metadata.with_description(description.clone()),
            None => metadata,
        }
    }

    pub fn to_definition(&self) -> Result<ModelDefinition, ManifestError> {
        Ok(ModelDefinition {
            name: self.name.clone(),
            schema: self.to_schema()?,
            validator: self.to_validator()?,
            metadata: self.to_metadata(),
        })
    }
}

fn default_public() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldManifest {
    pub name: String,
    /// External key; `"-"` ignores the field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default = "default_public", skip_serializing_if = "is_true")]
    pub public: bool,
    #[serde(flatten)]
    pub ty: TypeManifest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<RuleManifest>,
}

impl FieldManifest {
    pub fn to_field_schema(&self) -> Result<FieldSchema, ManifestError> {
        let mut field = FieldSchema::new(self.name.clone(), self.ty.to_kind(&self.name)?);
        if let Some(tag) = &self.tag {
            field = field.with_tag(tag.clone());
        }
        if !self.public {
            field = field.private();
        }
        Ok(field)
    }
}

/// Type of a field or of a collection element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeManifest {
    #[serde(rename = "type")]
    pub type_name: String,
    /// Element type of an `array`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<TypeManifest>>,
    /// Key type of a `map`; defaults to `string`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<String>,
    /// Value type of a `map`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Box<TypeManifest>>,
    /// Fields of an `object`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldManifest>>,
}

impl TypeManifest {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            items: None,
            keys: None,
            values: None,
            fields: None,
        }
    }

    /// Resolve to a field kind; `field` names the field in errors
    pub fn to_kind(&self, field: &str) -> Result<FieldKind, ManifestError> {
        if let Some(kind) = scalar_kind(&self.type_name) {
            return Ok(kind);
        }

        match self.type_name.as_str() {
            "array" => {
                let items = self.items.as_ref().ok_or_else(|| self.missing(field, "items"))?;
                Ok(FieldKind::sequence_of(items.to_kind(&format!("{}[]", field))?))
            }
            "map" => {
                let key_name = self.keys.as_deref().unwrap_or("string");
                let key = scalar_kind(key_name)
                    .filter(FieldKind::is_key_kind)
                    .ok_or_else(|| ManifestError::UnknownType {
                        field: format!("{} (keys)", field),
                        type_name: key_name.to_string(),
                    })?;
                let values = self.values.as_ref().ok_or_else(|| self.missing(field, "values"))?;
                Ok(FieldKind::mapping_of(key, values.to_kind(&format!("{}{{}}", field))?))
            }
            "object" => {
                let fields = self.fields.as_ref().ok_or_else(|| self.missing(field, "fields"))?;
                Ok(FieldKind::struct_of(build_schema(field, fields)?))
            }
            other => Err(ManifestError::UnknownType {
                field: field.to_string(),
                type_name: other.to_string(),
            }),
        }
    }

    fn missing(&self, field: &str, missing: &str) -> ManifestError {
        ManifestError::MissingElementType {
            field: field.to_string(),
            type_name: self.type_name.clone(),
            missing: missing.to_string(),
        }
    }
}

fn scalar_kind(type_name: &str) -> Option<FieldKind> {
    let kind = match type_name {
        "string" => FieldKind::String,
        "bool" | "boolean" => FieldKind::Bool,
        "int8" => FieldKind::Int(IntWidth::W8),
        "int16" => FieldKind::Int(IntWidth::W16),
        "int32" => FieldKind::Int(IntWidth::W32),
        "int64" | "integer" => FieldKind::Int(IntWidth::W64),
        "uint8" => FieldKind::UInt(IntWidth::W8),
        "uint16" => FieldKind::UInt(IntWidth::W16),
        "uint32" => FieldKind::UInt(IntWidth::W32),
        "uint64" => FieldKind::UInt(IntWidth::W64),
        "float32" => FieldKind::Float(FloatWidth::W32),
        "float64" | "number" => FieldKind::Float(FloatWidth::W64),
        "timestamp" => FieldKind::Timestamp,
        "json" => FieldKind::Json,
        _ => return None,
    };
    Some(kind)
}

fn build_schema(name: &str, fields: &[FieldManifest]) -> Result<TypeSchema, ManifestError> {
    let mut schema = TypeSchema::new(name);
    for field in fields {
        schema.add_field(field.to_field_schema()?);
    }
    Ok(schema)
}

fn collect_rules(fields: &[FieldManifest], prefix: &str, validator: &mut RuleValidator) -> Result<(), ManifestError> {
    for field in fields {
        let path = if prefix.is_empty() {
            field.name.clone()
        } else {
            format!("{}.{}", prefix, field.name)
        };

        if let Some(rules) = &field.rules {
            validator.add_rule(rules.to_rule(&path)?);
        }

        if field.ty.type_name == "object" {
            if let Some(nested) = &field.ty.fields {
                collect_rules(nested, &path, validator)?;
            }
        }
    }
    Ok(())
}

/// Declarative constraints for one field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleManifest {
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forbidden_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<Value>>,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RuleManifest {
    pub fn to_rule(&self, field: &str) -> Result<FieldRule, ManifestError> {
        let invalid_pattern = |source| ManifestError::InvalidPattern {
            field: field.to_string(),
            source,
        };

        let mut rule = FieldRule::new(field)
            .with_length_range(self.min_length, self.max_length)
            .with_numeric_range(self.minimum, self.maximum);

        if self.required {
            rule = rule.required();
        }
        if let Some(pattern) = &self.pattern {
            rule = rule.with_pattern(pattern).map_err(invalid_pattern)?;
        }
        if let Some(pattern) = &self.forbidden_pattern {
            rule = rule.with_forbidden_pattern(pattern).map_err(invalid_pattern)?;
        }
        if let Some(allowed) = &self.allowed {
            rule = rule.with_enum(allowed.clone());
        }
        if self.severity == Severity::Warning {
            rule = rule.as_warning();
        }
        if let Some(message) = &self.message {
            rule = rule.with_message(message.clone());
        }
        Ok(rule)
    }
}
