use thiserror::Error;

use fragments_store::{FragmentKey, StoreError};

/// Errors from fragment construction, mutation and persistence.
#[derive(Debug, Error)]
pub enum FragmentError {
    /// Construction or update input was rejected. Nothing was persisted.
    #[error("validation error: {0}")]
    Validation(String),

    /// No metadata record exists for the key.
    #[error("fragment not found: {0}")]
    NotFound(FragmentKey),

    /// The metadata record exists but no payload was ever stored.
    #[error("fragment data missing: {0}")]
    MissingData(FragmentKey),

    #[error(transparent)]
    Store(#[from] StoreError),
}
