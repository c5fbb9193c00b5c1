use std::path::PathBuf;

use anyhow::Result;
use serde_json::json;
use tracing::debug;

use super::{advisories_json, record_json, store_failure, tool_failure};
use crate::context::AppContext;
use crate::store::RemoveOutcome;
use crate::tooling::advisory::{Advisory, AdvisoryKind};
use crate::ExecutionOutcome;

#[derive(Clone, Debug)]
pub struct RemoveRequest {
    pub folder: PathBuf,
    /// Forget the record but leave the folder's icon in place.
    pub keep_icon: bool,
}

/// Clears a folder's custom icon and drops its record together with the
/// managed copies. Folders without a record are left untouched.
///
/// # Errors
/// Returns an error only for unexpected failures.
pub fn remove_icon(ctx: &mut AppContext, request: &RemoveRequest) -> Result<ExecutionOutcome> {
    let folder = crate::runtime::absolutize(&request.folder)?;
    let key = folder.display().to_string();
    let (store, _, effects) = ctx.parts_mut();

    let mut advisories = Vec::new();
    if store.get_by_folder(&key).is_none() {
        debug!(folder = %key, "no record, leaving folder icon alone");
    } else if request.keep_icon {
        debug!(folder = %key, "keeping folder icon");
    } else if !folder.is_dir() {
        debug!(folder = %key, "folder is gone, dropping record only");
    } else {
        if let Err(err) = effects.icon_tool().remove(&folder) {
            return Ok(tool_failure(format!("failed to remove icon from {key}"), &err));
        }
        if let Err(err) = effects.cache().refresh(&folder) {
            advisories.push(Advisory::raise(AdvisoryKind::CacheRefresh, &folder, err));
        }
    }

    match store.remove_application(&key) {
        Ok(RemoveOutcome::Removed {
            record,
            advisories: cleanup,
        }) => {
            advisories.extend(cleanup);
            Ok(ExecutionOutcome::success(
                format!("removed icon from {key}"),
                json!({
                    "folder": key,
                    "removed": true,
                    "record": record_json(store, &record)?,
                    "advisories": advisories_json(&advisories),
                }),
            ))
        }
        Ok(RemoveOutcome::NotFound) => Ok(ExecutionOutcome::success(
            format!("no icon recorded for {key}"),
            json!({ "folder": key, "removed": false }),
        )),
        Err(err) => Ok(store_failure(&err)),
    }
}
