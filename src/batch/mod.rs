pub mod manager;
pub mod session;

pub use manager::BatchSessionManager;
pub use session::{BatchSession, BatchStatus, BatchVerdict, SessionOptions};
