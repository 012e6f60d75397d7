use bytes::Bytes;
use chrono::Utc;

use fragments_core::{FragmentId, FragmentRecord, OwnerId};

use crate::error::StoreError;
use crate::store::FragmentStore;

fn owner(name: &str) -> OwnerId {
    OwnerId::new(format!("conformance-{name}"))
}

fn record(owner: &OwnerId, id: &str, size: u64) -> FragmentRecord {
    let now = Utc::now();
    FragmentRecord {
        id: FragmentId::new(id),
        owner_id: owner.clone(),
        created: now,
        updated: now,
        media_type: "text/plain".into(),
        size,
    }
}

/// Run the full fragment store conformance test suite.
///
/// Call this from your backend's test module with a fresh store instance.
/// The suite ends by calling [`FragmentStore::reset`].
///
/// # Errors
///
/// Returns an error if the backend fails an operation.
pub async fn run_store_conformance_tests(store: &dyn FragmentStore) -> Result<(), StoreError> {
    test_get_missing(store).await?;
    test_metadata_roundtrip(store).await?;
    test_metadata_overwrite(store).await?;
    test_put_metadata_rejects_empty_keys(store).await?;
    test_data_roundtrip(store).await?;
    test_data_overwrite(store).await?;
    test_metadata_without_data(store).await?;
    test_list_scoped_to_owner(store).await?;
    test_keys_with_separators(store).await?;
    test_long_and_unusual_keys(store).await?;
    test_delete(store).await?;
    test_reset(store).await?;
    Ok(())
}

async fn test_get_missing(store: &dyn FragmentStore) -> Result<(), StoreError> {
    let owner = owner("missing");
    let id = FragmentId::new("nope");
    assert!(
        store.get_metadata(&owner, &id).await?.is_none(),
        "get_metadata on missing key should return None"
    );
    assert!(
        store.get_data(&owner, &id).await?.is_none(),
        "get_data on missing key should return None"
    );
    assert!(store.list_ids(&owner).await?.is_empty());
    Ok(())
}

async fn test_metadata_roundtrip(store: &dyn FragmentStore) -> Result<(), StoreError> {
    let owner = owner("meta");
    let rec = record(&owner, "m1", 5);
    let stored = store.put_metadata(&owner, &rec).await?;
    assert_eq!(stored, rec, "put_metadata should return the stored record");

    let got = store.get_metadata(&owner, &rec.id).await?;
    assert_eq!(got.as_ref(), Some(&rec));
    Ok(())
}

async fn test_metadata_overwrite(store: &dyn FragmentStore) -> Result<(), StoreError> {
    let owner = owner("meta-overwrite");
    store.put_metadata(&owner, &record(&owner, "m1", 1)).await?;
    let replacement = record(&owner, "m1", 42);
    store.put_metadata(&owner, &replacement).await?;

    let got = store.get_metadata(&owner, &replacement.id).await?;
    assert_eq!(got.map(|r| r.size), Some(42), "metadata should be replaced");
    assert_eq!(store.list_ids(&owner).await?.len(), 1);
    Ok(())
}

async fn test_put_metadata_rejects_empty_keys(store: &dyn FragmentStore) -> Result<(), StoreError> {
    let empty_owner = OwnerId::new("");
    let result = store
        .put_metadata(&empty_owner, &record(&empty_owner, "x", 0))
        .await;
    assert!(
        matches!(result, Err(StoreError::InvalidArgument(_))),
        "empty owner should be rejected"
    );

    let owner = owner("empty-id");
    let result = store.put_metadata(&owner, &record(&owner, "", 0)).await;
    assert!(
        matches!(result, Err(StoreError::InvalidArgument(_))),
        "empty id should be rejected"
    );
    assert!(store.list_ids(&owner).await?.is_empty());
    Ok(())
}

async fn test_data_roundtrip(store: &dyn FragmentStore) -> Result<(), StoreError> {
    let owner = owner("data");
    let id = FragmentId::new("d1");
    let written = store
        .put_data(&owner, &id, Bytes::from_static(b"hello"))
        .await?;
    assert_eq!(written, 5, "put_data should return the byte count");

    let got = store.get_data(&owner, &id).await?;
    assert_eq!(got.as_deref(), Some(&b"hello"[..]));

    let empty = FragmentId::new("d-empty");
    assert_eq!(store.put_data(&owner, &empty, Bytes::new()).await?, 0);
    let got = store.get_data(&owner, &empty).await?;
    assert_eq!(
        got.as_deref(),
        Some(&b""[..]),
        "empty payload is distinct from no payload"
    );
    Ok(())
}

async fn test_data_overwrite(store: &dyn FragmentStore) -> Result<(), StoreError> {
    let owner = owner("data-overwrite");
    let id = FragmentId::new("d1");
    store
        .put_data(&owner, &id, Bytes::from_static(b"first version"))
        .await?;
    store.put_data(&owner, &id, Bytes::from_static(b"2nd")).await?;

    let got = store.get_data(&owner, &id).await?;
    assert_eq!(got.as_deref(), Some(&b"2nd"[..]));
    Ok(())
}

async fn test_metadata_without_data(store: &dyn FragmentStore) -> Result<(), StoreError> {
    let owner = owner("meta-only");
    let rec = record(&owner, "m1", 0);
    store.put_metadata(&owner, &rec).await?;

    assert_eq!(store.list_ids(&owner).await?, vec![rec.id.clone()]);
    assert!(store.get_data(&owner, &rec.id).await?.is_none());
    Ok(())
}

async fn test_list_scoped_to_owner(store: &dyn FragmentStore) -> Result<(), StoreError> {
    let alice = owner("list-alice");
    let bob = owner("list-bob");
    store.put_metadata(&alice, &record(&alice, "a", 1)).await?;
    store.put_metadata(&alice, &record(&alice, "b", 2)).await?;
    store.put_metadata(&bob, &record(&bob, "c", 3)).await?;

    // Payload presence alone does not make an id listable.
    store
        .put_data(&alice, &FragmentId::new("orphan"), Bytes::from_static(b"x"))
        .await?;

    let mut ids = store.list_ids(&alice).await?;
    ids.sort();
    assert_eq!(ids, vec![FragmentId::new("a"), FragmentId::new("b")]);

    let mut records = store.list_metadata(&alice).await?;
    records.sort_by(|x, y| x.id.cmp(&y.id));
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].size, 1);
    assert_eq!(records[1].size, 2);
    assert!(records.iter().all(|r| r.owner_id == alice));

    assert_eq!(store.list_ids(&bob).await?, vec![FragmentId::new("c")]);
    Ok(())
}

async fn test_keys_with_separators(store: &dyn FragmentStore) -> Result<(), StoreError> {
    let first = OwnerId::new("conformance-sep:a");
    let second = OwnerId::new("conformance-sep");
    store.put_metadata(&first, &record(&first, "b", 1)).await?;
    store
        .put_data(&first, &FragmentId::new("b"), Bytes::from_static(b"first"))
        .await?;

    let aliased = FragmentId::new("a:b");
    assert!(
        store.get_metadata(&second, &aliased).await?.is_none(),
        "owner/id separators must not alias"
    );
    assert!(store.get_data(&second, &aliased).await?.is_none());
    assert!(store.list_ids(&second).await?.is_empty());
    Ok(())
}

async fn test_long_and_unusual_keys(store: &dyn FragmentStore) -> Result<(), StoreError> {
    let owners = [
        OwnerId::new(format!("conformance-long-{}", "o".repeat(512))),
        OwnerId::new("conformance-odd/../ünï cødé\\:*?"),
    ];
    let ids = [
        "x".repeat(1024),
        "a/b/../../c".to_owned(),
        "ünï cødé:*?\"<>|".to_owned(),
        ".hidden".to_owned(),
    ];

    for owner in &owners {
        for id in &ids {
            let rec = record(owner, id, 2);
            store.put_metadata(owner, &rec).await?;
            store
                .put_data(owner, &rec.id, Bytes::from_static(b"ok"))
                .await?;

            assert_eq!(store.get_metadata(owner, &rec.id).await?.as_ref(), Some(&rec));
            assert_eq!(
                store.get_data(owner, &rec.id).await?.as_deref(),
                Some(&b"ok"[..]),
                "payload for id of length {}",
                id.len()
            );
        }

        let mut listed = store.list_ids(owner).await?;
        listed.sort();
        let mut expected: Vec<FragmentId> =
            ids.iter().map(|id| FragmentId::new(id.as_str())).collect();
        expected.sort();
        assert_eq!(listed, expected, "list_ids must return ids verbatim");

        for id in &ids {
            assert!(store.delete(owner, &FragmentId::new(id.as_str())).await?);
        }
        assert!(store.list_ids(owner).await?.is_empty());
    }
    Ok(())
}

async fn test_delete(store: &dyn FragmentStore) -> Result<(), StoreError> {
    let owner = owner("delete");
    let rec = record(&owner, "gone", 3);
    store.put_metadata(&owner, &rec).await?;
    store
        .put_data(&owner, &rec.id, Bytes::from_static(b"bye"))
        .await?;

    assert!(store.delete(&owner, &rec.id).await?, "delete should return true");
    assert!(store.get_metadata(&owner, &rec.id).await?.is_none());
    assert!(store.get_data(&owner, &rec.id).await?.is_none());
    assert!(store.list_ids(&owner).await?.is_empty());

    assert!(
        !store.delete(&owner, &rec.id).await?,
        "delete on missing key should return false"
    );

    // A payload without metadata still counts as something removed.
    let orphan = FragmentId::new("orphan");
    store
        .put_data(&owner, &orphan, Bytes::from_static(b"x"))
        .await?;
    assert!(store.delete(&owner, &orphan).await?);
    Ok(())
}

async fn test_reset(store: &dyn FragmentStore) -> Result<(), StoreError> {
    let owner = owner("reset");
    let rec = record(&owner, "r1", 1);
    store.put_metadata(&owner, &rec).await?;
    store
        .put_data(&owner, &rec.id, Bytes::from_static(b"r"))
        .await?;

    store.reset().await?;

    assert!(store.get_metadata(&owner, &rec.id).await?.is_none());
    assert!(store.get_data(&owner, &rec.id).await?.is_none());
    assert!(store.list_ids(&owner).await?.is_empty());
    assert!(store.list_ids(&self::owner("meta")).await?.is_empty());

    // The store stays usable after a reset.
    store.put_metadata(&owner, &rec).await?;
    assert_eq!(store.list_ids(&owner).await?, vec![rec.id.clone()]);
    store.reset().await?;
    Ok(())
}
