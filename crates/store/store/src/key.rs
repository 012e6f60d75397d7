use serde::{Deserialize, Serialize};

use fragments_core::{FragmentId, FragmentRecord, OwnerId};

use crate::error::StoreError;

/// Composite key addressing one fragment: the owner plus the fragment id.
///
/// Backends key their maps on this struct (or on an encoding that keeps the
/// two components apart), so an owner or id containing a separator character
/// can never alias another key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FragmentKey {
    pub owner: OwnerId,
    pub id: FragmentId,
}

impl FragmentKey {
    /// Create a new fragment key.
    #[must_use]
    pub fn new(owner: impl Into<OwnerId>, id: impl Into<FragmentId>) -> Self {
        Self {
            owner: owner.into(),
            id: id.into(),
        }
    }

    /// Build the key for a stored metadata record.
    #[must_use]
    pub fn of(record: &FragmentRecord) -> Self {
        Self {
            owner: record.owner_id.clone(),
            id: record.id.clone(),
        }
    }

    /// Reject keys with an empty owner or id.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.owner.is_empty() {
            return Err(StoreError::InvalidArgument("owner id is required".into()));
        }
        if self.id.is_empty() {
            return Err(StoreError::InvalidArgument("fragment id is required".into()));
        }
        Ok(())
    }
}

impl std::fmt::Display for FragmentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.id)
    }
}

/// Validate the arguments of a metadata write.
///
/// The owner must be non-empty, the record must carry an id, and the record's
/// own owner must match the owner it is filed under.
pub fn validate_metadata_write(owner: &OwnerId, record: &FragmentRecord) -> Result<(), StoreError> {
    FragmentKey::new(owner.clone(), record.id.clone()).validate()?;
    if record.owner_id != *owner {
        return Err(StoreError::InvalidArgument(format!(
            "record owner {} does not match {owner}",
            record.owner_id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn record(owner: &str, id: &str) -> FragmentRecord {
        let now = Utc::now();
        FragmentRecord {
            id: FragmentId::new(id),
            owner_id: OwnerId::new(owner),
            created: now,
            updated: now,
            media_type: "text/plain".into(),
            size: 0,
        }
    }

    #[test]
    fn keys_with_separators_do_not_collide() {
        let a = FragmentKey::new("a:b", "c");
        let b = FragmentKey::new("a", "b:c");
        assert_ne!(a, b);
    }

    #[test]
    fn validate_rejects_empty_parts() {
        assert!(FragmentKey::new("", "id").validate().is_err());
        assert!(FragmentKey::new("owner", "").validate().is_err());
        assert!(FragmentKey::new("owner", "id").validate().is_ok());
    }

    #[test]
    fn metadata_write_requires_matching_owner() {
        let owner = OwnerId::new("o1");
        assert!(validate_metadata_write(&owner, &record("o1", "f")).is_ok());
        assert!(matches!(
            validate_metadata_write(&owner, &record("o2", "f")),
            Err(StoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            validate_metadata_write(&OwnerId::new(""), &record("", "f")),
            Err(StoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            validate_metadata_write(&owner, &record("o1", "")),
            Err(StoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn display_joins_owner_and_id() {
        assert_eq!(FragmentKey::new("o", "f").to_string(), "o/f");
    }
}
