use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tracing::debug;

use fragments_core::{FragmentId, FragmentRecord, OwnerId};
use fragments_store::error::StoreError;
use fragments_store::key::{FragmentKey, validate_metadata_write};
use fragments_store::store::FragmentStore;

/// In-memory [`FragmentStore`] backed by two [`DashMap`]s.
///
/// Metadata and payloads are kept in independent maps keyed by
/// [`FragmentKey`]. Nothing is evicted and nothing survives the process.
/// Separate instances share no state.
#[derive(Debug, Default)]
pub struct MemoryFragmentStore {
    metadata: DashMap<FragmentKey, FragmentRecord>,
    data: DashMap<FragmentKey, Bytes>,
}

impl MemoryFragmentStore {
    /// Create a new, empty in-memory fragment store.
    pub fn new() -> Self {
        Self::default()
    }

    fn key(owner: &OwnerId, id: &FragmentId) -> FragmentKey {
        FragmentKey::new(owner.clone(), id.clone())
    }
}

#[async_trait]
impl FragmentStore for MemoryFragmentStore {
    async fn put_metadata(
        &self,
        owner: &OwnerId,
        record: &FragmentRecord,
    ) -> Result<FragmentRecord, StoreError> {
        validate_metadata_write(owner, record)?;

        let key = Self::key(owner, &record.id);
        debug!(%owner, id = %record.id, size = record.size, "writing fragment metadata");
        self.metadata.insert(key, record.clone());
        Ok(record.clone())
    }

    async fn get_metadata(
        &self,
        owner: &OwnerId,
        id: &FragmentId,
    ) -> Result<Option<FragmentRecord>, StoreError> {
        Ok(self
            .metadata
            .get(&Self::key(owner, id))
            .map(|entry| entry.value().clone()))
    }

    async fn put_data(
        &self,
        owner: &OwnerId,
        id: &FragmentId,
        data: Bytes,
    ) -> Result<u64, StoreError> {
        let key = Self::key(owner, id);
        key.validate()?;

        let size = data.len() as u64;
        debug!(%owner, %id, size, "writing fragment data");
        self.data.insert(key, data);
        Ok(size)
    }

    async fn get_data(
        &self,
        owner: &OwnerId,
        id: &FragmentId,
    ) -> Result<Option<Bytes>, StoreError> {
        Ok(self
            .data
            .get(&Self::key(owner, id))
            .map(|entry| entry.value().clone()))
    }

    async fn list_ids(&self, owner: &OwnerId) -> Result<Vec<FragmentId>, StoreError> {
        Ok(self
            .metadata
            .iter()
            .filter(|entry| entry.key().owner == *owner)
            .map(|entry| entry.key().id.clone())
            .collect())
    }

    async fn list_metadata(&self, owner: &OwnerId) -> Result<Vec<FragmentRecord>, StoreError> {
        Ok(self
            .metadata
            .iter()
            .filter(|entry| entry.key().owner == *owner)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn delete(&self, owner: &OwnerId, id: &FragmentId) -> Result<bool, StoreError> {
        let key = Self::key(owner, id);
        let had_metadata = self.metadata.remove(&key).is_some();
        let had_data = self.data.remove(&key).is_some();
        debug!(%owner, %id, had_metadata, had_data, "deleted fragment");
        Ok(had_metadata || had_data)
    }

    async fn reset(&self) -> Result<(), StoreError> {
        self.metadata.clear();
        self.data.clear();
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
