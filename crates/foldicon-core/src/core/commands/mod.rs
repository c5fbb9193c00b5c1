//! Command handlers. Each one takes the [`AppContext`] and a request and
//! returns an [`ExecutionOutcome`]; expected failures are outcomes, not
//! errors.
//!
//! [`AppContext`]: crate::context::AppContext

mod apply;
mod inspect;
mod paths;
mod remove;
mod restore;
mod workspace;

pub use apply::{apply_icon, ApplyRequest};
pub use inspect::{list_icons, show_icon, ShowRequest};
pub use paths::{path_denormalize, path_normalize, PathRequest};
pub use remove::{remove_icon, RemoveRequest};
pub use restore::restore_icons;
pub use workspace::{workspace_set, workspace_show, WorkspaceSetRequest};

use anyhow::Result;
use foldicon_domain::IconApplicationRecord;
use serde_json::{json, Value};

use crate::effects::IconToolError;
use crate::store::{AssetError, RecordStore, StoreError};
use crate::tooling::advisory::Advisory;
use crate::ExecutionOutcome;

const MISSING_TOOL_HINT: &str =
    "install fileicon (`brew install fileicon`) or point FOLDICON_ICON_TOOL at a compatible tool";

/// A record as shown to users: current-user paths plus the absolute
/// location of its icon copy.
pub(crate) fn record_json(store: &RecordStore, record: &IconApplicationRecord) -> Result<Value> {
    let record = store.denormalized(record);
    let mut value = serde_json::to_value(&record)?;
    value["resolvedIconPath"] = json!(store.resolve_icon_path(&record));
    Ok(value)
}

pub(crate) fn advisories_json(advisories: &[Advisory]) -> Value {
    json!(advisories)
}

pub(crate) fn store_failure(err: &StoreError) -> ExecutionOutcome {
    ExecutionOutcome::failure(
        "failed to update the icon record store",
        json!({ "code": err.code(), "reason": err.to_string() }),
    )
}

pub(crate) fn asset_failure(err: &AssetError) -> ExecutionOutcome {
    let details = json!({ "code": err.code(), "reason": err.to_string() });
    match err {
        AssetError::SourceUnreadable { path, .. } => ExecutionOutcome::user_error(
            format!("icon source not readable: {}", path.display()),
            details,
        ),
        AssetError::InvalidDataUrl(_) => {
            ExecutionOutcome::user_error("icon data URL could not be decoded", details)
        }
        AssetError::Write { .. } => {
            ExecutionOutcome::failure("failed to copy icon into the workspace", details)
        }
    }
}

pub(crate) fn tool_failure(message: String, err: &IconToolError) -> ExecutionOutcome {
    let mut details = json!({ "code": err.code(), "reason": err.reason() });
    if matches!(err, IconToolError::MissingExecutable { .. }) {
        details["hint"] = json!(MISSING_TOOL_HINT);
    }
    ExecutionOutcome::user_error(message, details)
}
