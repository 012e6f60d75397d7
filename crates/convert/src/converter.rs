use bytes::Bytes;

use crate::error::ConvertError;

/// One entry of the conversion table.
///
/// A converter turns a payload of [`source_type`](Converter::source_type)
/// into the representation named by [`extension`](Converter::extension).
/// Implementations are pure and synchronous; loading the payload is the
/// caller's job.
pub trait Converter: Send + Sync {
    /// Normalized media type this converter reads.
    fn source_type(&self) -> &str;

    /// Lower-case target extension without a leading dot.
    fn extension(&self) -> &str;

    /// Content type of the produced bytes, parameters included.
    fn result_type(&self) -> &str;

    /// Transform `input` into the target representation.
    fn convert(&self, input: &[u8]) -> Result<Bytes, ConvertError>;
}
