pub mod identifier;
pub(crate) mod sync;

pub use identifier::Identifier;
