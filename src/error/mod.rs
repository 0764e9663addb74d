pub mod batch_error;
pub mod conversion_error;
pub mod gateway_error;
pub mod manifest_error;
pub mod registry_error;

pub use batch_error::BatchError;
pub use conversion_error::ConversionError;
pub use gateway_error::{ErrorResponse, GatewayError, GatewayErrorCode};
pub use manifest_error::ManifestError;
pub use registry_error::RegistryError;

pub type Result<T> = std::result::Result<T, GatewayError>;
