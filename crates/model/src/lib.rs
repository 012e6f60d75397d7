pub mod error;
pub mod fragment;

pub use error::FragmentError;
pub use fragment::{Fragment, NewFragment};
