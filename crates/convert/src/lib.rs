//! Conversion of stored fragments into other representations.
//!
//! Conversions are looked up in a [`ConversionRegistry`] keyed by
//! `(source media type, target extension)`. Adding a format means
//! registering another [`Converter`].

pub mod converter;
pub mod error;
pub mod markdown;
pub mod registry;
pub mod service;

pub use converter::Converter;
pub use error::ConvertError;
pub use markdown::MarkdownToHtml;
pub use registry::ConversionRegistry;
pub use service::{ConversionService, Converted};
