//! Redis fragment store backend.
//!
//! Each owner gets two Redis hashes, one for metadata and one for payloads:
//!
//! | Key | Field | Value |
//! |-----|-------|-------|
//! | `{prefix}:meta:{owner}` | fragment id | JSON metadata record |
//! | `{prefix}:data:{owner}` | fragment id | raw payload bytes |
//!
//! The fragment id is a hash field rather than part of the key, so owners and
//! ids containing `:` cannot alias one another, and listing an owner's
//! fragments is a single `HKEYS`/`HVALS` call.
//!
//! # Example
//!
//! ```ignore
//! use fragments_store_redis::{RedisConfig, RedisFragmentStore};
//!
//! let config = RedisConfig::new("redis://127.0.0.1:6379").with_prefix("notes");
//! let store = RedisFragmentStore::new(&config)?;
//! ```

mod config;
mod key_render;
mod store;

pub use config::RedisConfig;
pub use store::RedisFragmentStore;
