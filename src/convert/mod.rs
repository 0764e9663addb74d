pub mod converter;
mod numeric;

pub use converter::Converter;
