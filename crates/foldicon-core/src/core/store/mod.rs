//! Workspace-scoped persistence: the icon record store and the managed
//! icon copies it points at.

mod assets;
mod errors;
mod record_store;

pub use assets::{
    managed_file_name, sanitize_icon_name, AssetManager, IconSource, MaterializedSource,
};
pub use errors::{AssetError, StoreError};
pub use record_store::{RecordStore, RecordedApplication, RemoveOutcome, DB_FILE_NAME};
