use chrono::{DateTime, Utc};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::type_schema::{FieldKind, FieldSchema, TypeSchema};

/// Key of a mapping field after conversion
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey {
    String(String),
    Int(i64),
    UInt(u64),
    Bool(bool),
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::String(key) => write!(f, "{}", key),
            MapKey::Int(key) => write!(f, "{}", key),
            MapKey::UInt(key) => write!(f, "{}", key),
            MapKey::Bool(key) => write!(f, "{}", key),
        }
    }
}

/// A typed value held by a [`Record`] field.
///
/// Integer and float widths are enforced by the schema at conversion time; the
/// stored representation is always the widest of its family.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Sequence(Vec<FieldValue>),
    Mapping(BTreeMap<MapKey, FieldValue>),
    Struct(Record),
    Timestamp(Option<DateTime<Utc>>),
    Json(Value),
}

impl FieldValue {
    /// Zero value for a field kind
    pub fn zero(kind: &FieldKind) -> Self {
        match kind {
            FieldKind::String => FieldValue::String(String::new()),
            FieldKind::Bool => FieldValue::Bool(false),
            FieldKind::Int(_) => FieldValue::Int(0),
            FieldKind::UInt(_) => FieldValue::UInt(0),
            FieldKind::Float(_) => FieldValue::Float(0.0),
            FieldKind::Sequence(_) => FieldValue::Sequence(Vec::new()),
            FieldKind::Mapping { .. } => FieldValue::Mapping(BTreeMap::new()),
            FieldKind::Struct(schema) => FieldValue::Struct(Record::zeroed(Arc::clone(schema))),
            FieldKind::Timestamp => FieldValue::Timestamp(None),
            FieldKind::Json => FieldValue::Json(Value::Null),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::String(_) => "string",
            FieldValue::Bool(_) => "bool",
            FieldValue::Int(_) => "int",
            FieldValue::UInt(_) => "uint",
            FieldValue::Float(_) => "float",
            FieldValue::Sequence(_) => "array",
            FieldValue::Mapping(_) => "map",
            FieldValue::Struct(_) => "struct",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::Json(_) => "json",
        }
    }

    /// Whether the value equals the zero value of its kind
    pub fn is_zero(&self) -> bool {
        match self {
            FieldValue::String(value) => value.is_empty(),
            FieldValue::Bool(value) => !value,
            FieldValue::Int(value) => *value == 0,
            FieldValue::UInt(value) => *value == 0,
            FieldValue::Float(value) => *value == 0.0,
            FieldValue::Sequence(items) => items.is_empty(),
            FieldValue::Mapping(entries) => entries.is_empty(),
            FieldValue::Struct(record) => record.values.iter().all(FieldValue::is_zero),
            FieldValue::Timestamp(value) => value.is_none(),
            FieldValue::Json(value) => value.is_null(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(value) => Some(*value),
            FieldValue::UInt(value) => i64::try_from(*value).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::UInt(value) => Some(*value),
            FieldValue::Int(value) => u64::try_from(*value).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(value) => Some(*value),
            FieldValue::Int(value) => Some(*value as f64),
            FieldValue::UInt(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            FieldValue::Struct(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<MapKey, FieldValue>> {
        match self {
            FieldValue::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(value) => *value,
            _ => None,
        }
    }

    /// Length for strings (in characters), sequences and mappings
    pub fn len(&self) -> Option<usize> {
        match self {
            FieldValue::String(value) => Some(value.chars().count()),
            FieldValue::Sequence(items) => Some(items.len()),
            FieldValue::Mapping(entries) => Some(entries.len()),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::String(value) => Value::String(value.clone()),
            FieldValue::Bool(value) => Value::Bool(*value),
            FieldValue::Int(value) => Value::Number(Number::from(*value)),
            FieldValue::UInt(value) => Value::Number(Number::from(*value)),
            FieldValue::Float(value) => Number::from_f64(*value).map(Value::Number).unwrap_or(Value::Null),
            FieldValue::Sequence(items) => Value::Array(items.iter().map(FieldValue::to_json).collect()),
            FieldValue::Mapping(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.to_json()))
                    .collect(),
            ),
            FieldValue::Struct(record) => record.to_json(),
            FieldValue::Timestamp(value) => value
                .map(|ts| Value::String(ts.to_rfc3339()))
                .unwrap_or(Value::Null),
            FieldValue::Json(value) => value.clone(),
        }
    }
}

/// Typed instance of a [`TypeSchema`]; one value per schema field, in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: Arc<TypeSchema>,
    values: Vec<FieldValue>,
}

impl Record {
    /// Fresh instance with every field at its zero value
    pub fn zeroed(schema: Arc<TypeSchema>) -> Self {
        let values = schema.fields().iter().map(|field| FieldValue::zero(&field.kind)).collect();
        Self { schema, values }
    }

    pub fn schema(&self) -> &Arc<TypeSchema> {
        &self.schema
    }

    pub fn type_name(&self) -> &str {
        self.schema.name()
    }

    /// Value of a field by its schema name
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.schema.field_index(name).and_then(|index| self.values.get(index))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        let index = self.schema.field_index(name)?;
        self.values.get_mut(index)
    }

    /// Dot-separated lookup through nested structs, e.g. `author.login`
    pub fn lookup(&self, path: &str) -> Option<&FieldValue> {
        let mut segments = path.split('.');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = current.as_record()?.get(segment)?;
        }
        Some(current)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldSchema, &FieldValue)> {
        self.schema.fields().iter().zip(self.values.iter())
    }

    pub(crate) fn values_mut(&mut self) -> &mut [FieldValue] {
        &mut self.values
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(FieldValue::as_bool)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FieldValue::as_i64)
    }

    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(FieldValue::as_u64)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FieldValue::as_f64)
    }

    pub fn get_record(&self, name: &str) -> Option<&Record> {
        self.get(name).and_then(FieldValue::as_record)
    }

    /// JSON view keyed by external keys; skipped fields are omitted
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        for (field, value) in self.iter() {
            if field.is_skipped() {
                continue;
            }
            object.insert(field.external_key().to_string(), value.to_json());
        }
        Value::Object(object)
    }
}
