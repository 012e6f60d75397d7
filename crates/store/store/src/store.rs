use async_trait::async_trait;
use bytes::Bytes;

use fragments_core::{FragmentId, FragmentRecord, OwnerId};

use crate::error::StoreError;

/// Trait for persisting fragment metadata and payloads.
///
/// Metadata records and payload bytes live in two independent namespaces that
/// share the same `(owner, id)` addressing. Each call is atomic on its own;
/// there are no transactions spanning calls, so concurrent writers to the
/// same key are last-writer-wins.
///
/// Implementations must be `Send + Sync` and safe for concurrent access.
#[async_trait]
pub trait FragmentStore: Send + Sync {
    /// Insert or replace a metadata record. Returns the stored record.
    ///
    /// Fails with [`StoreError::InvalidArgument`] when `owner` or `record.id`
    /// is empty.
    async fn put_metadata(
        &self,
        owner: &OwnerId,
        record: &FragmentRecord,
    ) -> Result<FragmentRecord, StoreError>;

    /// Get a metadata record. Returns `None` if not found.
    async fn get_metadata(
        &self,
        owner: &OwnerId,
        id: &FragmentId,
    ) -> Result<Option<FragmentRecord>, StoreError>;

    /// Insert or replace a payload. Returns the number of bytes stored.
    async fn put_data(&self, owner: &OwnerId, id: &FragmentId, data: Bytes)
    -> Result<u64, StoreError>;

    /// Get a payload. Returns `None` if no payload was stored.
    async fn get_data(&self, owner: &OwnerId, id: &FragmentId)
    -> Result<Option<Bytes>, StoreError>;

    /// List the ids of every fragment with a metadata record for `owner`.
    ///
    /// Order is unspecified.
    async fn list_ids(&self, owner: &OwnerId) -> Result<Vec<FragmentId>, StoreError>;

    /// List every metadata record for `owner`.
    async fn list_metadata(&self, owner: &OwnerId) -> Result<Vec<FragmentRecord>, StoreError>;

    /// Delete metadata and payload. Returns `true` if either existed.
    async fn delete(&self, owner: &OwnerId, id: &FragmentId) -> Result<bool, StoreError>;

    /// Remove every record and payload for every owner.
    async fn reset(&self) -> Result<(), StoreError>;

    /// Short backend identifier (e.g. `"memory"`), used in logs.
    fn backend_name(&self) -> &'static str;
}
