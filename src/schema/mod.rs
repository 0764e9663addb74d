pub mod extract;
pub mod record;
pub mod type_schema;

pub use extract::FromFieldValue;
pub use record::{FieldValue, MapKey, Record};
pub use type_schema::{FieldKind, FieldSchema, FloatWidth, IntWidth, TypeSchema, IGNORE_TAG};
