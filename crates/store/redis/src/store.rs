use async_trait::async_trait;
use bytes::Bytes;
use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;
use tracing::debug;

use fragments_core::{FragmentId, FragmentRecord, OwnerId};
use fragments_store::error::StoreError;
use fragments_store::key::{FragmentKey, validate_metadata_write};
use fragments_store::store::FragmentStore;

use crate::config::RedisConfig;
use crate::key_render::{data_key, metadata_key, prefix_pattern};

/// Redis-backed implementation of [`FragmentStore`].
///
/// Uses a `deadpool-redis` connection pool. Metadata and payload writes are
/// single `HSET` commands; deletes remove both hash fields in one pipeline.
pub struct RedisFragmentStore {
    pool: Pool,
    prefix: String,
}

impl RedisFragmentStore {
    /// Create a new `RedisFragmentStore` from the provided configuration.
    ///
    /// No connection is opened until the first operation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidArgument`] for unusable settings and
    /// [`StoreError::Connection`] if the pool cannot be created.
    pub fn new(config: &RedisConfig) -> Result<Self, StoreError> {
        config.validate()?;
        let cfg = Config::from_url(&config.url);
        let pool = cfg
            .builder()
            .map(|b| {
                b.max_size(config.pool_size)
                    .wait_timeout(Some(config.connection_timeout))
                    .runtime(Runtime::Tokio1)
                    .build()
            })
            .map_err(|e| StoreError::Connection(e.to_string()))?
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self {
            pool,
            prefix: config.prefix.clone(),
        })
    }

    /// Obtain a connection from the pool.
    async fn conn(&self) -> Result<deadpool_redis::Connection, StoreError> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))
    }
}

fn backend_err(e: &redis::RedisError) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn parse_record(raw: &str) -> Result<FragmentRecord, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::Serialization(e.to_string()))
}

#[async_trait]
impl FragmentStore for RedisFragmentStore {
    async fn put_metadata(
        &self,
        owner: &OwnerId,
        record: &FragmentRecord,
    ) -> Result<FragmentRecord, StoreError> {
        validate_metadata_write(owner, record)?;

        let json =
            serde_json::to_string(record).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let mut conn = self.conn().await?;
        let () = conn
            .hset(metadata_key(&self.prefix, owner), record.id.as_str(), json)
            .await
            .map_err(|e| backend_err(&e))?;

        debug!(%owner, id = %record.id, size = record.size, "wrote fragment metadata");
        Ok(record.clone())
    }

    async fn get_metadata(
        &self,
        owner: &OwnerId,
        id: &FragmentId,
    ) -> Result<Option<FragmentRecord>, StoreError> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = conn
            .hget(metadata_key(&self.prefix, owner), id.as_str())
            .await
            .map_err(|e| backend_err(&e))?;

        raw.as_deref().map(parse_record).transpose()
    }

    async fn put_data(
        &self,
        owner: &OwnerId,
        id: &FragmentId,
        data: Bytes,
    ) -> Result<u64, StoreError> {
        FragmentKey::new(owner.clone(), id.clone()).validate()?;

        let mut conn = self.conn().await?;
        let () = conn
            .hset(data_key(&self.prefix, owner), id.as_str(), data.as_ref())
            .await
            .map_err(|e| backend_err(&e))?;

        debug!(%owner, %id, size = data.len(), "wrote fragment data");
        Ok(data.len() as u64)
    }

    async fn get_data(
        &self,
        owner: &OwnerId,
        id: &FragmentId,
    ) -> Result<Option<Bytes>, StoreError> {
        let mut conn = self.conn().await?;
        let raw: Option<Vec<u8>> = conn
            .hget(data_key(&self.prefix, owner), id.as_str())
            .await
            .map_err(|e| backend_err(&e))?;

        Ok(raw.map(Bytes::from))
    }

    async fn list_ids(&self, owner: &OwnerId) -> Result<Vec<FragmentId>, StoreError> {
        let mut conn = self.conn().await?;
        let ids: Vec<String> = conn
            .hkeys(metadata_key(&self.prefix, owner))
            .await
            .map_err(|e| backend_err(&e))?;

        Ok(ids.into_iter().map(FragmentId::new).collect())
    }

    async fn list_metadata(&self, owner: &OwnerId) -> Result<Vec<FragmentRecord>, StoreError> {
        let mut conn = self.conn().await?;
        let raw: Vec<String> = conn
            .hvals(metadata_key(&self.prefix, owner))
            .await
            .map_err(|e| backend_err(&e))?;

        raw.iter().map(|r| parse_record(r)).collect()
    }

    async fn delete(&self, owner: &OwnerId, id: &FragmentId) -> Result<bool, StoreError> {
        let mut conn = self.conn().await?;

        let removed: i64 = redis::pipe()
            .hdel(metadata_key(&self.prefix, owner), id.as_str())
            .hdel(data_key(&self.prefix, owner), id.as_str())
            .query_async(&mut conn)
            .await
            .map(|(a, b): (i64, i64)| a + b)
            .map_err(|e| backend_err(&e))?;

        debug!(%owner, %id, removed, "deleted fragment");
        Ok(removed > 0)
    }

    async fn reset(&self) -> Result<(), StoreError> {
        let pattern = prefix_pattern(&self.prefix);
        let mut conn = self.conn().await?;
        let mut cursor = 0u64;

        loop {
            let (new_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await
                .map_err(|e| backend_err(&e))?;

            if !keys.is_empty() {
                let _: i64 = redis::cmd("DEL")
                    .arg(&keys)
                    .query_async(&mut conn)
                    .await
                    .map_err(|e| backend_err(&e))?;
            }

            cursor = new_cursor;
            if cursor == 0 {
                break;
            }
        }

        debug!(prefix = %self.prefix, "reset fragment store");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pool_creation_is_lazy() {
        // No server is contacted until an operation runs.
        let store = RedisFragmentStore::new(&RedisConfig::new("redis://127.0.0.1:1"))
            .expect("pool creation should succeed");
        assert_eq!(store.backend_name(), "redis");
    }

    #[test]
    fn zero_pool_is_rejected() {
        let result = RedisFragmentStore::new(&RedisConfig::default().with_pool_size(0));
        assert!(matches!(result, Err(StoreError::InvalidArgument(_))));
    }

    #[test]
    fn invalid_url_is_a_connection_error() {
        let result = RedisFragmentStore::new(&RedisConfig::new("not a url"));
        assert!(matches!(result, Err(StoreError::Connection(_))));
    }
}
