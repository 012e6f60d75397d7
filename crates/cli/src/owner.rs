use sha2::{Digest, Sha256};

use fragments_core::OwnerId;

/// Derive the owner id for a user identity (lowercase hex SHA-256 of the
/// lower-cased identity).
///
/// The raw identity, typically an email address, never reaches the store.
pub fn owner_id_for(identity: &str) -> OwnerId {
    let mut hasher = Sha256::new();
    hasher.update(identity.to_lowercase().as_bytes());
    OwnerId::new(hex::encode(hasher.finalize()))
}
