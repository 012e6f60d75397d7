use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};
use uuid::Uuid;

use fragments_core::{FragmentId, FragmentRecord, OwnerId};
use fragments_store::error::StoreError;
use fragments_store::key::{FragmentKey, validate_metadata_write};
use fragments_store::store::FragmentStore;

use crate::config::FsConfig;
use crate::key_render::{encode_segment, is_segment};

const META_DIR: &str = "meta";
const DATA_DIR: &str = "data";
const META_EXT: &str = "json";
const DATA_EXT: &str = "bin";

/// Durable [`FragmentStore`] that keeps one file per record and per payload.
///
/// Writes land in a uniquely named temporary file which is synced and then
/// renamed over the target, so readers never observe a partial file.
#[derive(Debug)]
pub struct FsFragmentStore {
    root: PathBuf,
}

impl FsFragmentStore {
    /// Open (and create if needed) a store rooted at `config.root`.
    pub async fn new(config: &FsConfig) -> Result<Self, StoreError> {
        let store = Self {
            root: config.root.clone(),
        };
        store.create_trees().await?;
        Ok(store)
    }

    /// The directory this store writes under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn create_trees(&self) -> Result<(), StoreError> {
        fs::create_dir_all(self.root.join(META_DIR)).await?;
        fs::create_dir_all(self.root.join(DATA_DIR)).await?;
        Ok(())
    }

    fn owner_dir(&self, tree: &str, owner: &OwnerId) -> PathBuf {
        self.root.join(tree).join(encode_segment(owner))
    }

    fn meta_path(&self, owner: &OwnerId, id: &FragmentId) -> PathBuf {
        self.owner_dir(META_DIR, owner)
            .join(format!("{}.{META_EXT}", encode_segment(id)))
    }

    fn data_path(&self, owner: &OwnerId, id: &FragmentId) -> PathBuf {
        self.owner_dir(DATA_DIR, owner)
            .join(format!("{}.{DATA_EXT}", encode_segment(id)))
    }
}

/// Write `contents` to `path` via a synced temporary file and a rename.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    // Fixed-length temp names starting with '.' so listings skip them.
    let temp_path = path.with_file_name(format!(".tmp-{}", Uuid::new_v4().simple()));

    let mut file = match fs::File::create(&temp_path).await {
        Ok(file) => file,
        // The owner directory is missing, or was pruned by a concurrent delete.
        Err(e) if e.kind() == ErrorKind::NotFound => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::File::create(&temp_path).await?
        }
        Err(e) => return Err(e.into()),
    };
    file.write_all(contents).await?;
    file.sync_all().await?;
    drop(file);

    if let Err(e) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(e.into());
    }
    Ok(())
}

/// Read a file, mapping "not found" to `None`.
async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Remove a file. Returns `true` if it existed.
async fn remove_if_exists(path: &Path) -> Result<bool, StoreError> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Remove `dir` if it is empty. A missing or non-empty directory is left alone.
async fn prune_empty_dir(dir: &Path) -> Result<(), StoreError> {
    match fs::remove_dir(dir).await {
        Ok(()) => Ok(()),
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::DirectoryNotEmpty) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Remove a directory tree, tolerating its absence.
async fn remove_tree(path: &Path) -> Result<(), StoreError> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn parse_record(path: &Path, bytes: &[u8]) -> Result<FragmentRecord, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| {
        StoreError::Serialization(format!("invalid metadata in {}: {e}", path.display()))
    })
}

#[async_trait]
impl FragmentStore for FsFragmentStore {
    #[instrument(skip(self, record), fields(backend = "filesystem", id = %record.id))]
    async fn put_metadata(
        &self,
        owner: &OwnerId,
        record: &FragmentRecord,
    ) -> Result<FragmentRecord, StoreError> {
        validate_metadata_write(owner, record)?;

        let json =
            serde_json::to_vec(record).map_err(|e| StoreError::Serialization(e.to_string()))?;
        write_atomic(&self.meta_path(owner, &record.id), &json).await?;
        debug!(size = record.size, "wrote fragment metadata");
        Ok(record.clone())
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn get_metadata(
        &self,
        owner: &OwnerId,
        id: &FragmentId,
    ) -> Result<Option<FragmentRecord>, StoreError> {
        let path = self.meta_path(owner, id);
        match read_optional(&path).await? {
            Some(bytes) => parse_record(&path, &bytes).map(Some),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, data), fields(backend = "filesystem", size = data.len()))]
    async fn put_data(
        &self,
        owner: &OwnerId,
        id: &FragmentId,
        data: Bytes,
    ) -> Result<u64, StoreError> {
        FragmentKey::new(owner.clone(), id.clone()).validate()?;

        write_atomic(&self.data_path(owner, id), &data).await?;
        debug!("wrote fragment data");
        Ok(data.len() as u64)
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn get_data(
        &self,
        owner: &OwnerId,
        id: &FragmentId,
    ) -> Result<Option<Bytes>, StoreError> {
        Ok(read_optional(&self.data_path(owner, id))
            .await?
            .map(Bytes::from))
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn list_ids(&self, owner: &OwnerId) -> Result<Vec<FragmentId>, StoreError> {
        Ok(self
            .list_metadata(owner)
            .await?
            .into_iter()
            .map(|record| record.id)
            .collect())
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn list_metadata(&self, owner: &OwnerId) -> Result<Vec<FragmentRecord>, StoreError> {
        let dir = self.owner_dir(META_DIR, owner);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let suffix = format!(".{META_EXT}");
        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(&suffix)) else {
                continue;
            };
            if !is_segment(stem) {
                continue;
            }
            let path = entry.path();
            // A concurrent delete between listing and reading just drops the entry.
            if let Some(bytes) = read_optional(&path).await? {
                records.push(parse_record(&path, &bytes)?);
            }
        }
        Ok(records)
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn delete(&self, owner: &OwnerId, id: &FragmentId) -> Result<bool, StoreError> {
        let had_metadata = remove_if_exists(&self.meta_path(owner, id)).await?;
        let had_data = remove_if_exists(&self.data_path(owner, id)).await?;
        prune_empty_dir(&self.owner_dir(META_DIR, owner)).await?;
        prune_empty_dir(&self.owner_dir(DATA_DIR, owner)).await?;
        debug!(had_metadata, had_data, "deleted fragment");
        Ok(had_metadata || had_data)
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn reset(&self) -> Result<(), StoreError> {
        remove_tree(&self.root.join(META_DIR)).await?;
        remove_tree(&self.root.join(DATA_DIR)).await?;
        self.create_trees().await
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use fragments_store::testing::run_store_conformance_tests;
    use tempfile::tempdir;

    use super::*;

    fn record(owner: &str, id: &str, size: u64) -> FragmentRecord {
        let now = Utc::now();
        FragmentRecord {
            id: FragmentId::new(id),
            owner_id: OwnerId::new(owner),
            created: now,
            updated: now,
            media_type: "text/markdown".into(),
            size,
        }
    }

    #[tokio::test]
    async fn conformance() {
        let temp = tempdir().unwrap();
        let store = FsFragmentStore::new(&FsConfig::new(temp.path().join("store")))
            .await
            .unwrap();
        run_store_conformance_tests(&store)
            .await
            .expect("conformance tests should pass");
    }

    #[tokio::test]
    async fn survives_reopen() {
        let temp = tempdir().unwrap();
        let config = FsConfig::new(temp.path());
        let owner = OwnerId::new("user@example.com");
        let rec = record("user@example.com", "f1", 4);

        {
            let store = FsFragmentStore::new(&config).await.unwrap();
            store.put_metadata(&owner, &rec).await.unwrap();
            store
                .put_data(&owner, &rec.id, Bytes::from_static(b"# Hi"))
                .await
                .unwrap();
        }

        let reopened = FsFragmentStore::new(&config).await.unwrap();
        assert_eq!(
            reopened.get_metadata(&owner, &rec.id).await.unwrap(),
            Some(rec.clone())
        );
        assert_eq!(
            reopened.get_data(&owner, &rec.id).await.unwrap().as_deref(),
            Some(&b"# Hi"[..])
        );
        assert_eq!(reopened.list_ids(&owner).await.unwrap(), vec![rec.id]);
    }

    #[tokio::test]
    async fn traversal_like_keys_stay_inside_root() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("store");
        let store = FsFragmentStore::new(&FsConfig::new(&root)).await.unwrap();
        let owner = OwnerId::new("../../etc");
        let id = FragmentId::new("../passwd");

        store
            .put_data(&owner, &id, Bytes::from_static(b"x"))
            .await
            .unwrap();

        let path = store.data_path(&owner, &id);
        assert!(path.starts_with(&root));
        assert!(fs::try_exists(&path).await.unwrap());
    }

    #[tokio::test]
    async fn listing_ignores_temp_and_foreign_files() {
        let temp = tempdir().unwrap();
        let store = FsFragmentStore::new(&FsConfig::new(temp.path()))
            .await
            .unwrap();
        let owner = OwnerId::new("o");
        store.put_metadata(&owner, &record("o", "f1", 0)).await.unwrap();

        let dir = store.owner_dir(META_DIR, &owner);
        fs::write(dir.join(".tmp-123"), b"junk").await.unwrap();
        fs::write(dir.join("README"), b"junk").await.unwrap();
        fs::write(dir.join("notes.json"), b"junk").await.unwrap();

        assert_eq!(
            store.list_ids(&owner).await.unwrap(),
            vec![FragmentId::new("f1")]
        );
    }

    #[tokio::test]
    async fn corrupt_metadata_is_a_serialization_error() {
        let temp = tempdir().unwrap();
        let store = FsFragmentStore::new(&FsConfig::new(temp.path()))
            .await
            .unwrap();
        let owner = OwnerId::new("o");
        let id = FragmentId::new("bad");
        let path = store.meta_path(&owner, &id);
        fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        fs::write(&path, b"{not json").await.unwrap();

        let result = store.get_metadata(&owner, &id).await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[tokio::test]
    async fn long_keys_use_fixed_length_names() {
        let temp = tempdir().unwrap();
        let store = FsFragmentStore::new(&FsConfig::new(temp.path()))
            .await
            .unwrap();
        let owner = OwnerId::new("o".repeat(1024));
        let rec = record(owner.as_str(), &"x".repeat(4096), 1);

        store.put_metadata(&owner, &rec).await.unwrap();
        store
            .put_data(&owner, &rec.id, Bytes::from_static(b"x"))
            .await
            .unwrap();

        let path = store.data_path(&owner, &rec.id);
        let name = path.file_name().unwrap().to_str().unwrap();
        assert_eq!(name.len(), crate::key_render::SEGMENT_LEN + ".bin".len());
        assert_eq!(store.list_ids(&owner).await.unwrap(), vec![rec.id.clone()]);
        assert_eq!(
            store.get_data(&owner, &rec.id).await.unwrap().as_deref(),
            Some(&b"x"[..])
        );
    }

    #[tokio::test]
    async fn delete_prunes_empty_owner_dirs() {
        let temp = tempdir().unwrap();
        let store = FsFragmentStore::new(&FsConfig::new(temp.path()))
            .await
            .unwrap();
        let owner = OwnerId::new("o");
        let keep = record("o", "keep", 1);
        let gone = record("o", "gone", 1);
        for rec in [&keep, &gone] {
            store.put_metadata(&owner, rec).await.unwrap();
            store
                .put_data(&owner, &rec.id, Bytes::from_static(b"x"))
                .await
                .unwrap();
        }

        assert!(store.delete(&owner, &gone.id).await.unwrap());
        assert!(store.owner_dir(META_DIR, &owner).is_dir());
        assert!(store.owner_dir(DATA_DIR, &owner).is_dir());

        assert!(store.delete(&owner, &keep.id).await.unwrap());
        assert!(!store.owner_dir(META_DIR, &owner).exists());
        assert!(!store.owner_dir(DATA_DIR, &owner).exists());

        // Writing again recreates the pruned directories.
        store.put_metadata(&owner, &keep).await.unwrap();
        assert_eq!(store.list_ids(&owner).await.unwrap(), vec![keep.id.clone()]);
    }
}
