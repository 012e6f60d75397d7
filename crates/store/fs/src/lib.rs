//! Filesystem fragment store backend.
//!
//! Metadata records are stored as JSON files and payloads as raw files under
//! a single root directory:
//!
//! ```text
//! <root>/meta/<sha256(owner)>/<sha256(id)>.json
//! <root>/data/<sha256(owner)>/<sha256(id)>.bin
//! ```
//!
//! Each key component is rendered as its hex SHA-256 digest, so any owner or
//! id string, however long, maps to one fixed-length path segment and the
//! two components can never alias. Ids are listed by reading them back from
//! the metadata records.

mod config;
mod key_render;
mod store;

pub use config::FsConfig;
pub use store::FsFragmentStore;
