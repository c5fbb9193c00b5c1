use std::path::{Path, PathBuf};

use anyhow::Result;
use foldicon_domain::{now_timestamp, IconAssetRef, NewApplication};
use serde_json::json;
use tracing::info;

use super::{advisories_json, asset_failure, record_json, store_failure, tool_failure};
use crate::context::AppContext;
use crate::store::IconSource;
use crate::tooling::advisory::{Advisory, AdvisoryKind};
use crate::ExecutionOutcome;

#[derive(Clone, Debug)]
pub struct ApplyRequest {
    pub folder: PathBuf,
    /// A file path or a `data:` URL.
    pub icon: String,
    /// Display name; defaults to the icon's file name.
    pub name: Option<String>,
    pub built_in: bool,
}

/// Copies the icon into the workspace, sets it on the folder, and records
/// the application.
///
/// # Errors
/// Returns an error only for unexpected failures (current directory,
/// clock formatting, JSON encoding).
pub fn apply_icon(ctx: &mut AppContext, request: &ApplyRequest) -> Result<ExecutionOutcome> {
    let folder = crate::runtime::absolutize(&request.folder)?;
    if !folder.is_dir() {
        let reason = if folder.exists() {
            format!("not a directory: {}", folder.display())
        } else {
            format!("folder not found: {}", folder.display())
        };
        return Ok(ExecutionOutcome::user_error(
            reason.clone(),
            json!({ "folder": folder, "reason": reason }),
        ));
    }

    let source = IconSource::parse(&request.icon);
    let name = request
        .name
        .clone()
        .unwrap_or_else(|| source.default_name());
    let original_icon_path = match &source {
        IconSource::File(path) => Some(path.display().to_string()),
        IconSource::DataUrl(_) => None,
    };

    let (store, assets, effects) = ctx.parts_mut();
    let materialized = match assets.materialize(&source) {
        Ok(materialized) => materialized,
        Err(err) => return Ok(asset_failure(&err)),
    };
    let stem = Path::new(&name)
        .file_stem()
        .map_or_else(|| name.clone(), |stem| stem.to_string_lossy().into_owned());
    let relative = match assets.copy_to_managed(materialized.path(), &stem) {
        Ok(relative) => relative,
        Err(err) => return Ok(asset_failure(&err)),
    };
    drop(materialized);
    let asset = IconAssetRef::classify(&relative);
    let managed = assets.resolve(&asset);

    if let Err(err) = effects.icon_tool().set(&folder, &managed) {
        let cleanup: Vec<Advisory> = assets.delete_asset(&asset).into_iter().collect();
        let mut outcome = tool_failure(
            format!("failed to set icon on {}", folder.display()),
            &err,
        );
        outcome.details["advisories"] = advisories_json(&cleanup);
        return Ok(outcome);
    }
    let mut advisories = Vec::new();
    if let Err(err) = effects.cache().refresh(&folder) {
        advisories.push(Advisory::raise(AdvisoryKind::CacheRefresh, &folder, err));
    }

    let recorded = match store.record_application(NewApplication {
        folder_path: folder.display().to_string(),
        source_icon_name: name.clone(),
        is_built_in: request.built_in,
        icon_path: relative,
        original_icon_path,
        applied_at: now_timestamp()?,
    }) {
        Ok(recorded) => recorded,
        Err(err) => {
            advisories.extend(assets.delete_asset(&asset));
            let mut outcome = store_failure(&err);
            outcome.details["advisories"] = advisories_json(&advisories);
            return Ok(outcome);
        }
    };
    info!(folder = %folder.display(), icon = %name, "applied icon");

    Ok(ExecutionOutcome::success(
        format!("applied {name} to {}", folder.display()),
        json!({
            "record": record_json(store, &recorded.record)?,
            "replaced": recorded.superseded.is_some(),
            "advisories": advisories_json(&advisories),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use crate::core::commands::testing::{Call, FakeEffects, Harness};
    use crate::CommandStatus;

    fn request(folder: PathBuf, icon: String) -> ApplyRequest {
        ApplyRequest {
            folder,
            icon,
            name: None,
            built_in: false,
        }
    }

    #[test]
    fn applies_and_records_normalized_paths() {
        let harness = Harness::new();
        let folder = harness.folder("Projects");
        let icon = harness.icon("sunset.png");
        let mut ctx = harness.context();

        let outcome = apply_icon(&mut ctx, &request(folder.clone(), icon.display().to_string()))
            .expect("apply");
        assert!(outcome.is_ok(), "{outcome:?}");

        let stored = ctx
            .store()
            .get_by_folder(&folder.display().to_string())
            .expect("record")
            .clone();
        assert_eq!(stored.folder_path, ctx.user().normalize(&folder.display().to_string()));
        assert!(stored.folder_path.contains("{USER}"));
        assert!(stored.icon_path.is_relative());
        assert!(stored.icon_path.as_str().starts_with("applied-icons/sunset-"));
        assert_eq!(stored.source_icon_name, "sunset.png");

        let managed = ctx.store().resolve_icon_path(&stored);
        assert_eq!(fs::read(&managed).expect("copy"), b"\x89PNG fake");
        assert_eq!(harness.effects.calls(), vec![Call::Set(folder, managed)]);
        assert_eq!(outcome.details["replaced"], false);
        assert_eq!(
            outcome.details["record"]["folderPath"],
            json!(stored.folder_path.replace("{USER}", "alice"))
        );
    }

    #[test]
    fn reapplying_keeps_one_record_and_the_old_copy() {
        let harness = Harness::new();
        let folder = harness.folder("Music");
        let first = harness.icon("a.png");
        let second = harness.icon("b.png");
        let mut ctx = harness.context();

        apply_icon(&mut ctx, &request(folder.clone(), first.display().to_string()))
            .expect("first");
        let old = ctx.store().all()[0].clone();
        let outcome = apply_icon(&mut ctx, &request(folder, second.display().to_string()))
            .expect("second");
        assert_eq!(outcome.details["replaced"], true);
        assert_eq!(ctx.store().len(), 1);
        assert!(ctx.store().resolve_icon_path(&old).is_file());
    }

    #[test]
    fn missing_folder_is_user_error() {
        let harness = Harness::new();
        let icon = harness.icon("a.png");
        let mut ctx = harness.context();
        let missing = harness.user.home().join("nope");
        let outcome =
            apply_icon(&mut ctx, &request(missing, icon.display().to_string())).expect("apply");
        assert_eq!(outcome.status, CommandStatus::UserError);
        assert!(outcome.message.starts_with("folder not found"));
        assert!(harness.effects.calls().is_empty());
    }

    #[test]
    fn unreadable_icon_without_fallback_is_user_error() {
        let harness = Harness::new();
        let folder = harness.folder("Docs");
        let mut ctx = harness.context();
        let outcome = apply_icon(&mut ctx, &request(folder, "/no/such/icon.png".into()))
            .expect("apply");
        assert_eq!(outcome.status, CommandStatus::UserError);
        assert_eq!(outcome.details["code"], "FI200");
        assert!(ctx.store().is_empty());
    }

    #[test]
    fn data_url_icons_are_decoded() {
        let harness = Harness::new();
        let folder = harness.folder("Pictures");
        let mut ctx = harness.context();
        // "hello" in base64
        let outcome = apply_icon(
            &mut ctx,
            &ApplyRequest {
                folder: folder.clone(),
                icon: "data:image/png;base64,aGVsbG8=".into(),
                name: Some("Custom".into()),
                built_in: true,
            },
        )
        .expect("apply");
        assert!(outcome.is_ok(), "{outcome:?}");
        let record = ctx.store().all()[0].clone();
        assert!(record.is_built_in);
        assert!(record.original_icon_path.is_none());
        assert!(record.icon_path.as_str().starts_with("applied-icons/Custom-"));
        assert!(record.icon_path.as_str().ends_with(".png"));
        let bytes = fs::read(ctx.store().resolve_icon_path(&record)).expect("copy");
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn tool_failure_discards_fresh_copy() {
        let harness = Harness::with_effects(FakeEffects {
            missing_tool: true,
            ..FakeEffects::default()
        });
        let folder = harness.folder("Projects");
        let icon = harness.icon("sunset.png");
        let mut ctx = harness.context();

        let outcome =
            apply_icon(&mut ctx, &request(folder, icon.display().to_string())).expect("apply");
        assert_eq!(outcome.status, CommandStatus::UserError);
        assert_eq!(outcome.details["code"], "FI300");
        assert!(outcome.details["hint"].is_string());
        assert!(ctx.store().is_empty());
        assert_eq!(outcome.details["advisories"], json!([]));
        let leftover = fs::read_dir(ctx.assets().applied_icons_dir())
            .expect("dir")
            .count();
        assert_eq!(leftover, 0);
    }

    #[test]
    fn tool_failure_reports_a_copy_it_could_not_discard() {
        let harness = Harness::with_effects(FakeEffects {
            pin_icon_on_failure: true,
            ..FakeEffects::default()
        });
        let folder = harness.folder("Projects");
        let icon = harness.icon("sunset.png");
        let mut ctx = harness.context();

        let outcome =
            apply_icon(&mut ctx, &request(folder, icon.display().to_string())).expect("apply");
        assert_eq!(outcome.status, CommandStatus::UserError);
        assert_eq!(outcome.details["code"], "FI302");
        let advisories = outcome.details["advisories"]
            .as_array()
            .expect("advisories");
        assert_eq!(advisories.len(), 1);
        assert_eq!(advisories[0]["kind"], "asset-cleanup");
        assert!(ctx.store().is_empty());
    }
}
