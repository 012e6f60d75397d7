use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{FragmentId, OwnerId};

/// Persisted metadata for one fragment.
///
/// This is the only representation of a fragment that is safe to hand to a
/// caller; it never carries the payload itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentRecord {
    /// Unique fragment identifier.
    pub id: FragmentId,
    /// Owner the fragment is scoped to.
    pub owner_id: OwnerId,
    /// When the fragment was created.
    pub created: DateTime<Utc>,
    /// When the payload was last changed.
    pub updated: DateTime<Utc>,
    /// Normalized media type.
    #[serde(rename = "type")]
    pub media_type: String,
    /// Payload length in bytes.
    pub size: u64,
}
