use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use fragments_core::media::{normalize, same_media_type};
use fragments_core::{FragmentId, FragmentRecord, OwnerId, TypePolicy};
use fragments_store::{FragmentKey, FragmentStore};

use crate::error::FragmentError;

/// Input for constructing a [`Fragment`].
///
/// Only the owner and content type are required; everything else is filled
/// in at construction time when absent.
#[derive(Debug, Clone)]
pub struct NewFragment {
    pub owner: OwnerId,
    /// Raw content type; normalized during construction.
    pub content_type: String,
    pub id: Option<FragmentId>,
    /// Initial size. Overridden by the length of `data` when one is given.
    pub size: u64,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub data: Option<Bytes>,
    /// Policy deciding which content types are accepted.
    pub policy: TypePolicy,
}

impl NewFragment {
    /// Start building a fragment for `owner` with the given content type.
    pub fn new(owner: impl Into<OwnerId>, content_type: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            content_type: content_type.into(),
            id: None,
            size: 0,
            created: None,
            updated: None,
            data: None,
            policy: TypePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<FragmentId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Supply an inline payload, applied as if by [`Fragment::set_data`].
    #[must_use]
    pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = Some(data.into());
        self
    }

    #[must_use]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    #[must_use]
    pub fn with_updated(mut self, updated: DateTime<Utc>) -> Self {
        self.updated = Some(updated);
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: TypePolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// One fragment: its metadata, an optional pending payload, and the store it
/// synchronizes with.
///
/// A `Fragment` is an ephemeral view. Mutations only touch memory until
/// [`Fragment::save`] is called; the store remains the sole durable owner of
/// fragment state.
#[derive(Clone)]
pub struct Fragment {
    store: Arc<dyn FragmentStore>,
    record: FragmentRecord,
    data: Option<Bytes>,
}

impl Fragment {
    /// Validate `params` and build a new in-memory fragment.
    ///
    /// Fails with [`FragmentError::Validation`] if the owner or content type is
    /// empty, the content type is not supported by `params.policy`, the id is
    /// empty, or an explicit `updated` precedes the explicit `created`.
    pub fn new(store: Arc<dyn FragmentStore>, params: NewFragment) -> Result<Self, FragmentError> {
        if let Err(e) = validate(&params) {
            warn!(owner = %params.owner, content_type = %params.content_type, error = %e, "rejected fragment");
            return Err(e);
        }

        let now = Utc::now();
        let created = params
            .created
            .unwrap_or_else(|| params.updated.map_or(now, |updated| updated.min(now)));
        let updated = params.updated.unwrap_or_else(|| now.max(created));

        let mut fragment = Self {
            store,
            record: FragmentRecord {
                id: params.id.unwrap_or_else(FragmentId::generate),
                owner_id: params.owner,
                created,
                updated,
                media_type: normalize(&params.content_type),
                size: params.size,
            },
            data: None,
        };

        if let Some(data) = params.data {
            fragment.set_data(data);
        }
        Ok(fragment)
    }

    /// Wrap a stored metadata record. The payload is not loaded.
    ///
    /// The record's type is trusted as-is; it was validated when the
    /// fragment was first constructed.
    pub fn from_record(store: Arc<dyn FragmentStore>, record: FragmentRecord) -> Self {
        Self {
            store,
            record,
            data: None,
        }
    }

    /// Load a fragment's metadata. Returns `None` if it does not exist.
    pub async fn by_id(
        store: &Arc<dyn FragmentStore>,
        owner: &OwnerId,
        id: &FragmentId,
    ) -> Result<Option<Self>, FragmentError> {
        let record = store.get_metadata(owner, id).await?;
        Ok(record.map(|r| Self::from_record(Arc::clone(store), r)))
    }

    /// Like [`Fragment::by_id`] but a missing fragment is an error.
    pub async fn load(
        store: &Arc<dyn FragmentStore>,
        owner: &OwnerId,
        id: &FragmentId,
    ) -> Result<Self, FragmentError> {
        Self::by_id(store, owner, id)
            .await?
            .ok_or_else(|| FragmentError::NotFound(FragmentKey::new(owner.clone(), id.clone())))
    }

    /// List the ids of every fragment `owner` has.
    pub async fn list_ids(
        store: &Arc<dyn FragmentStore>,
        owner: &OwnerId,
    ) -> Result<Vec<FragmentId>, FragmentError> {
        Ok(store.list_ids(owner).await?)
    }

    /// List every fragment `owner` has, metadata only.
    pub async fn list(
        store: &Arc<dyn FragmentStore>,
        owner: &OwnerId,
    ) -> Result<Vec<Self>, FragmentError> {
        let records = store.list_metadata(owner).await?;
        Ok(records
            .into_iter()
            .map(|r| Self::from_record(Arc::clone(store), r))
            .collect())
    }

    pub fn id(&self) -> &FragmentId {
        &self.record.id
    }

    pub fn owner(&self) -> &OwnerId {
        &self.record.owner_id
    }

    /// Normalized media type.
    pub fn media_type(&self) -> &str {
        &self.record.media_type
    }

    pub fn size(&self) -> u64 {
        self.record.size
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.record.created
    }

    pub fn updated(&self) -> DateTime<Utc> {
        self.record.updated
    }

    pub fn key(&self) -> FragmentKey {
        FragmentKey::of(&self.record)
    }

    /// Whether a payload has been set on this instance and will be written by
    /// the next [`Fragment::save`].
    pub fn has_pending_data(&self) -> bool {
        self.data.is_some()
    }

    /// Metadata snapshot, never including the payload.
    pub fn snapshot(&self) -> FragmentRecord {
        self.record.clone()
    }

    /// Replace the in-memory payload.
    ///
    /// Recomputes `size` and moves `updated` forward. Nothing is persisted
    /// until [`Fragment::save`].
    pub fn set_data(&mut self, data: impl Into<Bytes>) {
        let data = data.into();
        self.record.size = data.len() as u64;
        // Never step backwards, even if the wall clock does.
        self.record.updated = Utc::now().max(self.record.updated);
        self.data = Some(data);
    }

    /// Replace the payload with content of the same media type.
    ///
    /// Parameters such as `charset` are ignored when comparing; a different
    /// media type is a [`FragmentError::Validation`] and leaves the fragment
    /// untouched.
    pub fn replace_data(
        &mut self,
        content_type: &str,
        data: impl Into<Bytes>,
    ) -> Result<(), FragmentError> {
        if !same_media_type(&self.record.media_type, content_type) {
            return Err(FragmentError::Validation(format!(
                "content type mismatch: existing={} new={}",
                self.record.media_type,
                normalize(content_type)
            )));
        }
        self.set_data(data);
        Ok(())
    }

    /// Persist the metadata and, if one was set on this instance, the payload.
    ///
    /// Saving a fragment whose payload was never set leaves any previously
    /// stored payload untouched.
    pub async fn save(&self) -> Result<(), FragmentError> {
        let owner = &self.record.owner_id;
        self.store.put_metadata(owner, &self.record).await?;

        if let Some(data) = &self.data {
            let written = self.store.put_data(owner, &self.record.id, data.clone()).await?;
            debug!(%owner, id = %self.record.id, written, "saved fragment data");
        }

        info!(
            %owner,
            id = %self.record.id,
            media_type = %self.record.media_type,
            size = self.record.size,
            backend = self.store.backend_name(),
            "saved fragment"
        );
        Ok(())
    }

    /// Read the persisted payload. Returns `None` if none was stored.
    pub async fn get_data(&self) -> Result<Option<Bytes>, FragmentError> {
        Ok(self
            .store
            .get_data(&self.record.owner_id, &self.record.id)
            .await?)
    }

    /// Read the persisted payload, treating its absence as an error.
    pub async fn data(&self) -> Result<Bytes, FragmentError> {
        self.get_data()
            .await?
            .ok_or_else(|| FragmentError::MissingData(self.key()))
    }

    /// Delete metadata and payload from the store. Returns `true` if anything
    /// was removed.
    pub async fn delete(&self) -> Result<bool, FragmentError> {
        let removed = self
            .store
            .delete(&self.record.owner_id, &self.record.id)
            .await?;
        info!(owner = %self.record.owner_id, id = %self.record.id, removed, "deleted fragment");
        Ok(removed)
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fragment")
            .field("record", &self.record)
            .field("pending_data", &self.data.as_ref().map(Bytes::len))
            .field("backend", &self.store.backend_name())
            .finish()
    }
}

fn validate(params: &NewFragment) -> Result<(), FragmentError> {
    if params.owner.is_empty() {
        return Err(FragmentError::Validation("owner id is required".into()));
    }
    if params.content_type.trim().is_empty() {
        return Err(FragmentError::Validation("type is required".into()));
    }
    if !params.policy.is_supported(&params.content_type) {
        return Err(FragmentError::Validation(format!(
            "unsupported type: {}",
            params.content_type
        )));
    }
    if params.id.as_ref().is_some_and(|id| id.is_empty()) {
        return Err(FragmentError::Validation("id must not be empty".into()));
    }
    if let (Some(created), Some(updated)) = (params.created, params.updated)
        && updated < created
    {
        return Err(FragmentError::Validation(format!(
            "updated ({updated}) precedes created ({created})"
        )));
    }
    Ok(())
}
