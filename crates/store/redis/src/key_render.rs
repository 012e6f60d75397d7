use fragments_core::OwnerId;

/// Render the hash key holding an owner's metadata records.
///
/// The format is `prefix:meta:owner`.
pub fn metadata_key(prefix: &str, owner: &OwnerId) -> String {
    format!("{prefix}:meta:{owner}")
}

/// Render the hash key holding an owner's payloads.
///
/// The format is `prefix:data:owner`.
pub fn data_key(prefix: &str, owner: &OwnerId) -> String {
    format!("{prefix}:data:{owner}")
}

/// Glob pattern matching every key written under `prefix`.
pub fn prefix_pattern(prefix: &str) -> String {
    format!("{prefix}:*")
}
