use std::time::Duration;

use fragments_store::StoreError;

const DEFAULT_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_PREFIX: &str = "fragments";
const DEFAULT_POOL_SIZE: usize = 10;
const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection and key-layout settings for [`RedisFragmentStore`].
///
/// Every key the store writes starts with `prefix`, so several stores can
/// share one server and `reset` only clears its own keys.
///
/// [`RedisFragmentStore`]: crate::RedisFragmentStore
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
    /// Upper bound on pooled connections.
    pub pool_size: usize,
    /// How long an operation waits for a free pooled connection.
    pub connection_timeout: Duration,
}

impl RedisConfig {
    /// Settings for `url` with the default prefix and pool.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    #[must_use]
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Reject settings the pool cannot work with.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.prefix.is_empty() {
            return Err(StoreError::InvalidArgument("redis prefix must not be empty".into()));
        }
        if self.pool_size == 0 {
            return Err(StoreError::InvalidArgument("redis pool_size must be at least 1".into()));
        }
        if self.connection_timeout.is_zero() {
            return Err(StoreError::InvalidArgument(
                "redis connection_timeout must be positive".into(),
            ));
        }
        Ok(())
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_owned(),
            prefix: DEFAULT_PREFIX.to_owned(),
            pool_size: DEFAULT_POOL_SIZE,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let cfg = RedisConfig::new("redis://cache:6380")
            .with_prefix("frag")
            .with_pool_size(3)
            .with_connection_timeout(Duration::from_millis(250));
        assert_eq!(cfg.url, "redis://cache:6380");
        assert_eq!(cfg.prefix, "frag");
        assert_eq!(cfg.pool_size, 3);
        assert_eq!(cfg.connection_timeout, Duration::from_millis(250));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = RedisConfig::default();
        assert_eq!(cfg.prefix, "fragments");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_unusable_settings() {
        let base = RedisConfig::default();
        for cfg in [
            base.clone().with_prefix(""),
            base.clone().with_pool_size(0),
            base.with_connection_timeout(Duration::ZERO),
        ] {
            assert!(matches!(cfg.validate(), Err(StoreError::InvalidArgument(_))));
        }
    }
}
