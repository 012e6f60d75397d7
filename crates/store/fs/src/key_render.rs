use sha2::{Digest, Sha256};

/// Length of every rendered path segment.
pub const SEGMENT_LEN: usize = 64;

/// Render one key component as a fixed-length, file-name-safe segment
/// (lowercase hex SHA-256).
///
/// The mapping is one-way; the original id is read back from the stored
/// metadata record.
pub fn encode_segment(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

/// Return `true` if `name` could have been produced by [`encode_segment`].
pub fn is_segment(name: &str) -> bool {
    name.len() == SEGMENT_LEN && name.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
