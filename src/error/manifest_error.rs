use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Manifest parsing error{0}: input string is empty")]
    Empty(String),

    #[error("Manifest parsing error{context}: {detail}")]
    Parse { context: String, detail: String },

    #[error("Invalid version format '{0}': expected MAJOR.MINOR[.PATCH]")]
    InvalidVersion(String),

    #[error("Model type '{0}' is defined more than once in the manifest")]
    DuplicateModel(String),

    #[error("Unknown type '{type_name}' for field '{field}'")]
    UnknownType { field: String, type_name: String },

    #[error("Field '{field}' of type '{type_name}' is missing its {missing} definition")]
    MissingElementType {
        field: String,
        type_name: String,
        missing: String,
    },

    #[error("Invalid pattern for field '{field}': {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to read manifest file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
