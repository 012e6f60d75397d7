use thiserror::Error;

use fragments_model::FragmentError;
use fragments_store::FragmentKey;

/// Errors that can occur while converting a fragment.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// No fragment exists for the key.
    #[error("fragment not found: {0}")]
    NotFound(FragmentKey),

    /// No conversion is registered for the source type, or for the
    /// `(source type, extension)` pair when `extension` is set.
    #[error("unsupported conversion from {source_type}{}", target_suffix(.extension.as_deref()))]
    UnsupportedConversion {
        source_type: String,
        extension: Option<String>,
    },

    /// The converter rejected the input.
    #[error("transform failed: {0}")]
    Transform(String),

    #[error(transparent)]
    Fragment(#[from] FragmentError),
}

fn target_suffix(extension: Option<&str>) -> String {
    extension.map(|ext| format!(" to .{ext}")).unwrap_or_default()
}
