use chrono::{DateTime, Utc};
use log::debug;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::numeric;
use crate::error::ConversionError;
use crate::schema::{FieldKind, FieldValue, Record, TypeSchema};

/// Populates typed records from untyped JSON trees.
///
/// Fields are processed in declaration order. Missing keys and JSON `null`
/// leave the zero value in place; required-ness is the validator's concern.
pub struct Converter;

impl Converter {
    /// Build a fresh record of `schema` from a JSON object
    pub fn convert(schema: &Arc<TypeSchema>, data: &Value) -> Result<Record, ConversionError> {
        let mut record = Record::zeroed(Arc::clone(schema));
        Self::populate_record(&mut record, data)?;
        Ok(record)
    }

    /// Populate an existing struct destination in place.
    ///
    /// The destination must be a `FieldValue::Struct`; anything else is rejected
    /// before any field is touched.
    pub fn populate(target: &mut FieldValue, data: &Value) -> Result<(), ConversionError> {
        let record = match target {
            FieldValue::Struct(record) => record,
            other => {
                return Err(ConversionError::InvalidDestination(other.kind_name().to_string()));
            }
        };
        let object = expect_object(data, "")?;
        Self::fill(record, object, "")
    }

    /// Populate a fresh record (typically from `ModelRegistry::create_instance`)
    pub fn populate_record(record: &mut Record, data: &Value) -> Result<(), ConversionError> {
        let object = expect_object(data, "")?;
        Self::fill(record, object, "").map_err(|e| {
            debug!("Conversion into '{}' failed: {}", record.type_name(), e);
            e
        })
    }

    fn fill(record: &mut Record, data: &Map<String, Value>, path: &str) -> Result<(), ConversionError> {
        let schema = Arc::clone(record.schema());

        for (field, slot) in schema.fields().iter().zip(record.values_mut().iter_mut()) {
            if field.is_skipped() {
                continue;
            }

            let key = field.external_key();
            let source = match data.get(key) {
                None | Some(Value::Null) => continue,
                Some(source) => source,
            };

            *slot = Self::convert_value(&field.kind, source, &join_key(path, key))?;
        }

        Ok(())
    }

    fn convert_value(kind: &FieldKind, source: &Value, path: &str) -> Result<FieldValue, ConversionError> {
        if source.is_null() {
            return Ok(FieldValue::zero(kind));
        }

        match kind {
            // Only this direction is permissive: any scalar renders as text
            FieldKind::String => match source {
                Value::String(text) => Ok(FieldValue::String(text.clone())),
                Value::Number(number) => Ok(FieldValue::String(number.to_string())),
                Value::Bool(flag) => Ok(FieldValue::String(flag.to_string())),
                other => Err(mismatch(path, kind, other)),
            },
            FieldKind::Bool => match source {
                Value::Bool(flag) => Ok(FieldValue::Bool(*flag)),
                other => Err(mismatch(path, kind, other)),
            },
            FieldKind::Int(width) => match source {
                Value::Number(number) => numeric::to_int(number, *width, path).map(FieldValue::Int),
                other => Err(mismatch(path, kind, other)),
            },
            FieldKind::UInt(width) => match source {
                Value::Number(number) => numeric::to_uint(number, *width, path).map(FieldValue::UInt),
                other => Err(mismatch(path, kind, other)),
            },
            FieldKind::Float(width) => match source {
                Value::Number(number) => numeric::to_float(number, *width, path).map(FieldValue::Float),
                other => Err(mismatch(path, kind, other)),
            },
            FieldKind::Sequence(element) => {
                let items = source.as_array().ok_or_else(|| mismatch(path, kind, source))?;
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| Self::convert_value(element, item, &format!("{}[{}]", path, index)))
                    .collect::<Result<Vec<_>, _>>()
                    .map(FieldValue::Sequence)
            }
            FieldKind::Mapping { key, value } => {
                let object = source.as_object().ok_or_else(|| mismatch(path, kind, source))?;
                let mut entries = BTreeMap::new();
                for (raw_key, raw_value) in object {
                    let entry_path = format!("{}[{:?}]", path, raw_key);
                    let map_key = numeric::parse_key(raw_key, key, &entry_path)?;
                    let converted = Self::convert_value(value, raw_value, &entry_path)?;
                    if entries.insert(map_key, converted).is_some() {
                        // "01" and "1" both parse to the same integer key
                        return Err(ConversionError::InvalidKey {
                            path: entry_path,
                            key: raw_key.clone(),
                            expected: format!("unique {} key", key.type_name()),
                        });
                    }
                }
                Ok(FieldValue::Mapping(entries))
            }
            FieldKind::Struct(schema) => {
                let object = source.as_object().ok_or_else(|| mismatch(path, kind, source))?;
                let mut nested = Record::zeroed(Arc::clone(schema));
                Self::fill(&mut nested, object, path)?;
                Ok(FieldValue::Struct(nested))
            }
            FieldKind::Timestamp => serde_json::from_value::<DateTime<Utc>>(source.clone())
                .map(|ts| FieldValue::Timestamp(Some(ts)))
                .map_err(|e| ConversionError::Reencode {
                    path: path.to_string(),
                    target: kind.type_name(),
                    reason: e.to_string(),
                }),
            FieldKind::Json => Ok(FieldValue::Json(source.clone())),
        }
    }
}

fn expect_object<'a>(data: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ConversionError> {
    data.as_object().ok_or_else(|| ConversionError::TypeMismatch {
        path: path.to_string(),
        expected: "object".to_string(),
        actual: json_type_name(data).to_string(),
    })
}

fn mismatch(path: &str, kind: &FieldKind, actual: &Value) -> ConversionError {
    ConversionError::TypeMismatch {
        path: path.to_string(),
        expected: kind.type_name(),
        actual: json_type_name(actual).to_string(),
    }
}

fn join_key(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
