pub mod dispatch;
pub mod messages;
pub mod service;

pub use dispatch::ValidatorDispatch;
pub use messages::{
    AccumulateResponse, AccumulateStatus, BatchCompleteResponse, BatchStartRequest, BatchStartResponse,
    BatchStatusResponse, CompletionStatus, ValidationRequest, ValidationResponse,
};
pub use service::ValidationGateway;
