use std::path::PathBuf;

/// Configuration for the filesystem fragment store.
#[derive(Debug, Clone)]
pub struct FsConfig {
    /// Directory holding the `meta/` and `data/` trees. Created if missing.
    pub root: PathBuf,
}

impl FsConfig {
    /// Create a configuration rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("fragments-data"),
        }
    }
}
