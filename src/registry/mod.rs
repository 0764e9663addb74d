pub mod descriptor;
pub mod model_registry;

pub use descriptor::{ModelDescriptor, ModelMetadata, ModelSummary};
pub use model_registry::ModelRegistry;
