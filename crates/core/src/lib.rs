pub mod media;
pub mod record;
pub mod types;

pub use media::{ContentType, TypePolicy, normalize, same_media_type};
pub use record::FragmentRecord;
pub use types::{FragmentId, OwnerId};
