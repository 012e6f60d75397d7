use std::sync::Arc;
#[cfg(feature = "redis")]
use std::time::Duration;

use fragments_store::FragmentStore;
use fragments_store_fs::{FsConfig, FsFragmentStore};
use fragments_store_memory::MemoryFragmentStore;
#[cfg(feature = "redis")]
use fragments_store_redis::{RedisConfig, RedisFragmentStore};

use crate::config::StoreConfig;

/// Construct a `FragmentStore` from configuration.
pub async fn create_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn FragmentStore>> {
    match config.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryFragmentStore::new())),
        "filesystem" => create_filesystem(config).await,
        #[cfg(feature = "redis")]
        "redis" => create_redis(config),
        other => anyhow::bail!("unsupported store backend: {other} (is the feature enabled?)"),
    }
}

async fn create_filesystem(config: &StoreConfig) -> anyhow::Result<Arc<dyn FragmentStore>> {
    let store = FsFragmentStore::new(&FsConfig::new(&config.path))
        .await
        .map_err(|e| anyhow::anyhow!("filesystem store at {}: {e}", config.path.display()))?;
    Ok(Arc::new(store))
}

#[cfg(feature = "redis")]
fn redis_config(config: &StoreConfig) -> RedisConfig {
    let mut redis_config = RedisConfig::new(
        config
            .url
            .clone()
            .unwrap_or_else(|| RedisConfig::default().url),
    );
    if let Some(prefix) = &config.prefix {
        redis_config = redis_config.with_prefix(prefix.as_str());
    }
    if let Some(pool_size) = config.pool_size {
        redis_config = redis_config.with_pool_size(pool_size);
    }
    if let Some(secs) = config.connection_timeout_secs {
        redis_config = redis_config.with_connection_timeout(Duration::from_secs(secs));
    }
    redis_config
}

#[cfg(feature = "redis")]
fn create_redis(config: &StoreConfig) -> anyhow::Result<Arc<dyn FragmentStore>> {
    let store = RedisFragmentStore::new(&redis_config(config))
        .map_err(|e| anyhow::anyhow!("redis store: {e}"))?;
    Ok(Arc::new(store))
}
