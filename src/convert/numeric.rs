//! Range-checked numeric conversion. Nothing here truncates: a value that does
//! not fit the destination width is an `Overflow`, a fractional value headed
//! for an integer field is a `TypeMismatch`.

use serde_json::Number;

use crate::error::ConversionError;
use crate::schema::{FieldKind, FloatWidth, IntWidth, MapKey};

fn overflow(path: &str, value: impl ToString, target: String) -> ConversionError {
    ConversionError::Overflow {
        path: path.to_string(),
        value: value.to_string(),
        target,
    }
}

fn signed_name(width: IntWidth) -> String {
    format!("int{}", width.bits())
}

fn unsigned_name(width: IntWidth) -> String {
    format!("uint{}", width.bits())
}

pub(crate) fn to_int(number: &Number, width: IntWidth, path: &str) -> Result<i64, ConversionError> {
    let (min, max) = width.signed_range();

    if let Some(value) = number.as_i64() {
        if value < min || value > max {
            return Err(overflow(path, value, signed_name(width)));
        }
        return Ok(value);
    }

    if number.is_u64() {
        // as_i64 failed, so the value is above i64::MAX
        return Err(overflow(path, number, signed_name(width)));
    }

    let value = float_of(number, path, &signed_name(width))?;
    if value.fract() != 0.0 {
        return Err(ConversionError::TypeMismatch {
            path: path.to_string(),
            expected: signed_name(width),
            actual: format!("fractional number {}", value),
        });
    }
    // max + 1 is a power of two, so the upper bound is exact even for 64 bits
    if value < min as f64 || value >= max as f64 + 1.0 {
        return Err(overflow(path, value, signed_name(width)));
    }
    Ok(value as i64)
}

pub(crate) fn to_uint(number: &Number, width: IntWidth, path: &str) -> Result<u64, ConversionError> {
    let max = width.unsigned_max();

    if let Some(value) = number.as_u64() {
        if value > max {
            return Err(overflow(path, value, unsigned_name(width)));
        }
        return Ok(value);
    }

    if let Some(value) = number.as_i64() {
        // as_u64 failed, so the value is negative
        return Err(overflow(path, value, unsigned_name(width)));
    }

    let value = float_of(number, path, &unsigned_name(width))?;
    if value.fract() != 0.0 {
        return Err(ConversionError::TypeMismatch {
            path: path.to_string(),
            expected: unsigned_name(width),
            actual: format!("fractional number {}", value),
        });
    }
    if value < 0.0 || value >= max as f64 + 1.0 {
        return Err(overflow(path, value, unsigned_name(width)));
    }
    Ok(value as u64)
}

pub(crate) fn to_float(number: &Number, width: FloatWidth, path: &str) -> Result<f64, ConversionError> {
    match width {
        FloatWidth::W64 => float_of(number, path, "float64"),
        FloatWidth::W32 => {
            let value = float_of(number, path, "float32")?;
            if value.abs() > f32::MAX as f64 {
                return Err(overflow(path, value, "float32".to_string()));
            }
            Ok(value as f32 as f64)
        }
    }
}

fn float_of(number: &Number, path: &str, target: &str) -> Result<f64, ConversionError> {
    number.as_f64().ok_or_else(|| ConversionError::TypeMismatch {
        path: path.to_string(),
        expected: target.to_string(),
        actual: format!("number {}", number),
    })
}

/// Convert a JSON object key into the destination key kind
pub(crate) fn parse_key(key: &str, kind: &FieldKind, path: &str) -> Result<MapKey, ConversionError> {
    let invalid = || ConversionError::InvalidKey {
        path: path.to_string(),
        key: key.to_string(),
        expected: kind.type_name(),
    };

    match kind {
        FieldKind::String => Ok(MapKey::String(key.to_string())),
        FieldKind::Bool => match key {
            "true" => Ok(MapKey::Bool(true)),
            "false" => Ok(MapKey::Bool(false)),
            _ => Err(invalid()),
        },
        FieldKind::Int(width) => {
            let value: i64 = key.parse().map_err(|_| invalid())?;
            to_int(&Number::from(value), *width, path).map(MapKey::Int)
        }
        FieldKind::UInt(width) => {
            let value: u64 = key.parse().map_err(|_| invalid())?;
            to_uint(&Number::from(value), *width, path).map(MapKey::UInt)
        }
        _ => Err(invalid()),
    }
}
