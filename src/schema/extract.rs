//! Typed extraction out of a [`Record`], used by hand-written model converters.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::record::{FieldValue, Record};
use crate::error::ConversionError;

/// Conversion from a stored field value into a Rust type
pub trait FromFieldValue: Sized {
    const TYPE_NAME: &'static str;

    fn from_field_value(value: &FieldValue) -> Option<Self>;
}

macro_rules! integer_from_field_value {
    ($($ty:ty => $name:literal via $accessor:ident),* $(,)?) => {
        $(
            impl FromFieldValue for $ty {
                const TYPE_NAME: &'static str = $name;

                fn from_field_value(value: &FieldValue) -> Option<Self> {
                    value.$accessor().and_then(|v| <$ty>::try_from(v).ok())
                }
            }
        )*
    };
}

integer_from_field_value! {
    i8 => "int8" via as_i64,
    i16 => "int16" via as_i64,
    i32 => "int32" via as_i64,
    i64 => "int64" via as_i64,
    u8 => "uint8" via as_u64,
    u16 => "uint16" via as_u64,
    u32 => "uint32" via as_u64,
    u64 => "uint64" via as_u64,
}

impl FromFieldValue for String {
    const TYPE_NAME: &'static str = "string";

    fn from_field_value(value: &FieldValue) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromFieldValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_field_value(value: &FieldValue) -> Option<Self> {
        value.as_bool()
    }
}

impl FromFieldValue for f64 {
    const TYPE_NAME: &'static str = "float64";

    fn from_field_value(value: &FieldValue) -> Option<Self> {
        value.as_f64()
    }
}

impl FromFieldValue for f32 {
    const TYPE_NAME: &'static str = "float32";

    fn from_field_value(value: &FieldValue) -> Option<Self> {
        value.as_f64().map(|v| v as f32)
    }
}

impl FromFieldValue for Option<DateTime<Utc>> {
    const TYPE_NAME: &'static str = "timestamp";

    fn from_field_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

impl FromFieldValue for Value {
    const TYPE_NAME: &'static str = "json";

    fn from_field_value(value: &FieldValue) -> Option<Self> {
        Some(value.to_json())
    }
}

impl FromFieldValue for Record {
    const TYPE_NAME: &'static str = "struct";

    fn from_field_value(value: &FieldValue) -> Option<Self> {
        value.as_record().cloned()
    }
}

impl<T: FromFieldValue> FromFieldValue for Vec<T> {
    const TYPE_NAME: &'static str = "array";

    fn from_field_value(value: &FieldValue) -> Option<Self> {
        value.as_sequence()?.iter().map(T::from_field_value).collect()
    }
}

impl Record {
    /// Extract a field by schema name into a Rust type
    pub fn extract<T: FromFieldValue>(&self, name: &str) -> Result<T, ConversionError> {
        let value = self.get(name).ok_or_else(|| ConversionError::TypeMismatch {
            path: name.to_string(),
            expected: T::TYPE_NAME.to_string(),
            actual: "missing field".to_string(),
        })?;

        T::from_field_value(value).ok_or_else(|| ConversionError::TypeMismatch {
            path: name.to_string(),
            expected: T::TYPE_NAME.to_string(),
            actual: value.kind_name().to_string(),
        })
    }
}
