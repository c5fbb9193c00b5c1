use std::path::PathBuf;

use anyhow::Result;
use serde_json::{json, Value};

use super::record_json;
use crate::context::AppContext;
use crate::ExecutionOutcome;

#[derive(Clone, Debug)]
pub struct ShowRequest {
    pub folder: PathBuf,
}

/// Every recorded application, newest first.
///
/// # Errors
/// Returns an error if a record cannot be encoded.
pub fn list_icons(ctx: &AppContext) -> Result<ExecutionOutcome> {
    let store = ctx.store();
    let records = store.all();
    let rows = records
        .iter()
        .map(|record| record_json(store, record))
        .collect::<Result<Vec<Value>>>()?;
    let details = json!({
        "workspace": store.workspace_root(),
        "icons": rows,
    });
    if records.is_empty() {
        return Ok(ExecutionOutcome::success("no icons recorded", details));
    }
    let summary = records
        .iter()
        .map(|record| format!("{}  {}", record.folder_path, record.source_icon_name))
        .collect::<Vec<_>>()
        .join("\n");
    Ok(ExecutionOutcome::success(summary, details))
}

/// # Errors
/// Returns an error if the current directory cannot be resolved.
pub fn show_icon(ctx: &AppContext, request: &ShowRequest) -> Result<ExecutionOutcome> {
    let folder = crate::runtime::absolutize(&request.folder)?;
    let key = folder.display().to_string();
    let store = ctx.store();
    match store.get_by_folder(&key) {
        Some(record) => {
            let value = record_json(store, record)?;
            let icon = value["resolvedIconPath"].as_str().unwrap_or_default().to_string();
            Ok(ExecutionOutcome::success(
                format!("{key}: {} ({icon})", record.source_icon_name),
                json!({ "record": value }),
            ))
        }
        None => Ok(ExecutionOutcome::user_error(
            format!("no icon recorded for {key}"),
            json!({ "folder": key }),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use crate::core::commands::testing::Harness;
    use crate::core::commands::{apply_icon, ApplyRequest};
    use crate::CommandStatus;

    fn apply(ctx: &mut AppContext, folder: &Path, icon: &Path) {
        apply_icon(
            ctx,
            &ApplyRequest {
                folder: folder.to_path_buf(),
                icon: icon.display().to_string(),
                name: None,
                built_in: false,
            },
        )
        .expect("apply");
    }

    #[test]
    fn lists_current_user_paths() {
        let harness = Harness::new();
        let icon = harness.icon("sunset.png");
        let a = harness.folder("A");
        let b = harness.folder("B");
        let mut ctx = harness.context();
        apply(&mut ctx, &a, &icon);
        apply(&mut ctx, &b, &icon);

        let outcome = list_icons(&ctx).expect("list");
        let icons = outcome.details["icons"].as_array().expect("icons");
        assert_eq!(icons.len(), 2);
        for row in icons {
            let folder = row["folderPath"].as_str().expect("folder");
            assert!(!folder.contains("{USER}"));
            assert!(Path::new(folder).starts_with(harness.user.home()));
            assert!(Path::new(row["resolvedIconPath"].as_str().expect("icon")).is_file());
        }
    }

    #[test]
    fn empty_list_is_ok() {
        let harness = Harness::new();
        let ctx = harness.context();
        let outcome = list_icons(&ctx).expect("list");
        assert!(outcome.is_ok());
        assert_eq!(outcome.message, "no icons recorded");
    }

    #[test]
    fn show_finds_record_or_reports_missing() {
        let harness = Harness::new();
        let icon = harness.icon("sunset.png");
        let folder = harness.folder("Projects");
        let mut ctx = harness.context();
        apply(&mut ctx, &folder, &icon);

        let found = show_icon(
            &ctx,
            &ShowRequest {
                folder: folder.clone(),
            },
        )
        .expect("show");
        assert!(found.is_ok());
        assert_eq!(found.details["record"]["sourceIconName"], "sunset.png");

        let missing = show_icon(
            &ctx,
            &ShowRequest {
                folder: harness.user.home().join("Other"),
            },
        )
        .expect("show");
        assert_eq!(missing.status, CommandStatus::UserError);
    }
}
