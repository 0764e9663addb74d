use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Model type '{0}' is already registered with a different schema")]
    DuplicateName(String),

    #[error("Model type not found: {0}")]
    NotFound(String),

    #[error("Invalid model type name '{0}': {1}")]
    InvalidName(String, String),
}
