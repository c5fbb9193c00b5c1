#![deny(clippy::all, warnings)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod asset;
pub mod paths;
pub mod record;

pub use asset::{is_absolute_str, IconAssetRef, APPLIED_ICONS_DIR};
pub use paths::{contains_placeholder, UserContext, USER_PLACEHOLDER};
pub use record::{
    iso_timestamp, now_timestamp, sort_newest_first, IconApplicationRecord, NewApplication,
    StoreDocument,
};
