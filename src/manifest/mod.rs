pub mod manifest_parser;
pub mod model_manifest;

pub use manifest_parser::ManifestParser;
pub use model_manifest::{FieldManifest, Manifest, ModelDefinition, ModelManifest, RuleManifest, TypeManifest};
