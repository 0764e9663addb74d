use std::marker::PhantomData;

use super::result::ValidationResult;
use crate::error::ConversionError;
use crate::schema::{Record, TypeSchema};

/// Validation capability bound to a model type in the registry
pub trait Validator: Send + Sync {
    /// Identifier used in logs and listings
    fn name(&self) -> &str;

    fn validate(&self, record: &Record) -> ValidationResult;
}

/// Hand-written converter from a populated record into a Rust struct
pub trait FromRecord: Sized {
    fn from_record(record: &Record) -> Result<Self, ConversionError>;
}

/// Statically typed model: its schema plus its converter
pub trait Model: FromRecord + Send + Sync + 'static {
    fn schema() -> TypeSchema;
}

/// Validator backed by a closure over the untyped record
pub struct FnValidator<F> {
    name: String,
    func: F,
}

impl<F> FnValidator<F>
where
    F: Fn(&Record) -> ValidationResult + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Validator for FnValidator<F>
where
    F: Fn(&Record) -> ValidationResult + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, record: &Record) -> ValidationResult {
        (self.func)(record)
    }
}

/// Validator that first converts the record into `M`, then runs a closure over it
pub struct TypedValidator<M, F> {
    name: String,
    func: F,
    _model: PhantomData<fn() -> M>,
}

impl<M, F> TypedValidator<M, F>
where
    M: FromRecord,
    F: Fn(&M) -> ValidationResult + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
            _model: PhantomData,
        }
    }
}

impl<M, F> Validator for TypedValidator<M, F>
where
    M: FromRecord,
    F: Fn(&M) -> ValidationResult + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, record: &Record) -> ValidationResult {
        match M::from_record(record) {
            Ok(model) => (self.func)(&model),
            Err(e) => ValidationResult::from_conversion_error(&e),
        }
    }
}
