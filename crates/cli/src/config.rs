use std::path::{Path, PathBuf};

use serde::Deserialize;

use fragments_core::TypePolicy;

/// Top-level CLI configuration, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct FragmentsConfig {
    /// Store backend configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Accepted content types.
    #[serde(default)]
    pub types: TypesConfig,
}

impl FragmentsConfig {
    /// Load configuration from `path`, or defaults if the file does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            toml::from_str("")?
        };
        Ok(config)
    }
}

/// Configuration for the fragment store backend.
#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    /// Which backend to use: `"memory"`, `"filesystem"` or `"redis"`.
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Root directory for the filesystem backend.
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Connection URL for the redis backend.
    pub url: Option<String>,

    /// Key prefix for the redis backend. Defaults to `"fragments"`.
    pub prefix: Option<String>,

    /// Maximum pooled redis connections. Defaults to 10.
    pub pool_size: Option<usize>,

    /// Seconds to wait for a pooled redis connection. Defaults to 5.
    pub connection_timeout_secs: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_path(),
            url: None,
            prefix: None,
            pool_size: None,
            connection_timeout_secs: None,
        }
    }
}

fn default_backend() -> String {
    "filesystem".to_owned()
}

fn default_path() -> PathBuf {
    PathBuf::from("fragments-data")
}

#[derive(Debug, Default, Deserialize)]
pub struct TypesConfig {
    #[serde(default)]
    pub policy: TypePolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: FragmentsConfig = toml::from_str("").unwrap();
        assert_eq!(config.store.backend, "filesystem");
        assert_eq!(config.store.path, PathBuf::from("fragments-data"));
        assert!(config.store.url.is_none());
        assert!(config.store.prefix.is_none());
        assert!(config.store.pool_size.is_none());
        assert!(config.store.connection_timeout_secs.is_none());
        assert_eq!(config.types.policy, TypePolicy::Permissive);
    }

    #[test]
    fn parses_full_file() {
        let config: FragmentsConfig = toml::from_str(
            r#"
            [store]
            backend = "redis"
            path = "/var/lib/fragments"
            url = "redis://cache:6379"
            prefix = "frag"
            pool_size = 4
            connection_timeout_secs = 2

            [types]
            policy = "strict"
            "#,
        )
        .unwrap();
        assert_eq!(config.store.backend, "redis");
        assert_eq!(config.store.path, PathBuf::from("/var/lib/fragments"));
        assert_eq!(config.store.url.as_deref(), Some("redis://cache:6379"));
        assert_eq!(config.store.prefix.as_deref(), Some("frag"));
        assert_eq!(config.store.pool_size, Some(4));
        assert_eq!(config.store.connection_timeout_secs, Some(2));
        assert_eq!(config.types.policy, TypePolicy::Strict);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let result: Result<FragmentsConfig, _> = toml::from_str("[types]\npolicy = \"loose\"");
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = FragmentsConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.store.backend, "filesystem");
    }

    #[test]
    fn loads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fragments.toml");
        std::fs::write(&path, "[store]\nbackend = \"memory\"\n").unwrap();

        let config = FragmentsConfig::load(&path).unwrap();
        assert_eq!(config.store.backend, "memory");
    }
}
