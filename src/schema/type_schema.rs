use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;

/// Tag value that excludes a field from conversion
pub const IGNORE_TAG: &str = "-";

/// Bit width of an integer field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
}

impl IntWidth {
    pub fn bits(&self) -> u32 {
        match self {
            IntWidth::W8 => 8,
            IntWidth::W16 => 16,
            IntWidth::W32 => 32,
            IntWidth::W64 => 64,
        }
    }

    /// Inclusive range of a signed integer of this width
    pub fn signed_range(&self) -> (i64, i64) {
        match self {
            IntWidth::W8 => (i8::MIN as i64, i8::MAX as i64),
            IntWidth::W16 => (i16::MIN as i64, i16::MAX as i64),
            IntWidth::W32 => (i32::MIN as i64, i32::MAX as i64),
            IntWidth::W64 => (i64::MIN, i64::MAX),
        }
    }

    /// Largest value of an unsigned integer of this width
    pub fn unsigned_max(&self) -> u64 {
        match self {
            IntWidth::W8 => u8::MAX as u64,
            IntWidth::W16 => u16::MAX as u64,
            IntWidth::W32 => u32::MAX as u64,
            IntWidth::W64 => u64::MAX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatWidth {
    W32,
    W64,
}

/// Structural kind of a schema field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String,
    Bool,
    Int(IntWidth),
    UInt(IntWidth),
    Float(FloatWidth),
    Sequence(Box<FieldKind>),
    Mapping {
        key: Box<FieldKind>,
        value: Box<FieldKind>,
    },
    Struct(Arc<TypeSchema>),
    /// RFC 3339 timestamp, decoded through serde
    Timestamp,
    /// Arbitrary JSON kept as-is
    Json,
}

impl FieldKind {
    pub fn sequence_of(element: FieldKind) -> Self {
        FieldKind::Sequence(Box::new(element))
    }

    pub fn mapping_of(key: FieldKind, value: FieldKind) -> Self {
        FieldKind::Mapping {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn struct_of(schema: TypeSchema) -> Self {
        FieldKind::Struct(Arc::new(schema))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            FieldKind::String | FieldKind::Bool | FieldKind::Int(_) | FieldKind::UInt(_) | FieldKind::Float(_)
        )
    }

    /// Kinds a mapping key may have (JSON object keys are always text)
    pub fn is_key_kind(&self) -> bool {
        matches!(
            self,
            FieldKind::String | FieldKind::Bool | FieldKind::Int(_) | FieldKind::UInt(_)
        )
    }

    pub fn type_name(&self) -> String {
        match self {
            FieldKind::String => "string".to_string(),
            FieldKind::Bool => "bool".to_string(),
            FieldKind::Int(width) => format!("int{}", width.bits()),
            FieldKind::UInt(width) => format!("uint{}", width.bits()),
            FieldKind::Float(FloatWidth::W32) => "float32".to_string(),
            FieldKind::Float(FloatWidth::W64) => "float64".to_string(),
            FieldKind::Sequence(element) => format!("array<{}>", element.type_name()),
            FieldKind::Mapping { key, value } => {
                format!("map<{}, {}>", key.type_name(), value.type_name())
            }
            FieldKind::Struct(schema) => schema.name().to_string(),
            FieldKind::Timestamp => "timestamp".to_string(),
            FieldKind::Json => "json".to_string(),
        }
    }

    fn describe(&self) -> Value {
        match self {
            FieldKind::Struct(schema) => schema.describe(),
            other => Value::String(other.type_name()),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// One field of a [`TypeSchema`]
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub name: String,
    pub kind: FieldKind,
    /// External key override; [`IGNORE_TAG`] excludes the field
    pub tag: Option<String>,
    /// Non-public fields are never read from input
    pub public: bool,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            tag: None,
            public: true,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn ignored(self) -> Self {
        self.with_tag(IGNORE_TAG)
    }

    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    /// Key under which the field is looked up in untyped input
    pub fn external_key(&self) -> &str {
        match self.tag.as_deref() {
            Some(tag) if tag != IGNORE_TAG && !tag.is_empty() => tag,
            _ => &self.name,
        }
    }

    pub fn is_skipped(&self) -> bool {
        !self.public || self.tag.as_deref() == Some(IGNORE_TAG)
    }
}

/// Structural description of a model type: an ordered list of fields
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSchema {
    name: String,
    fields: Vec<FieldSchema>,
}

impl TypeSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field (builder style)
    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Append a plain field with no tag (builder style)
    pub fn with_field(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.field(FieldSchema::new(name, kind))
    }

    pub fn add_field(&mut self, field: FieldSchema) {
        self.fields.push(field);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_shared(self) -> Arc<TypeSchema> {
        Arc::new(self)
    }

    /// JSON description used in model listings
    pub fn describe(&self) -> Value {
        let fields: Vec<Value> = self
            .fields
            .iter()
            .filter(|field| !field.is_skipped())
            .map(|field| {
                json!({
                    "name": field.name,
                    "key": field.external_key(),
                    "type": field.kind.describe(),
                })
            })
            .collect();

        json!({ "name": self.name, "fields": fields })
    }
}
