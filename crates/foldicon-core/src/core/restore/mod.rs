//! Reapplies every recorded icon against the live workspace.
//!
//! Records are processed one at a time, in `RecordStore::all` order. Each
//! record moves through `Pending → Resolving → Verifying → Applying` and
//! ends `Succeeded` or `Failed`; a failure never stops the batch.

use std::path::{Path, PathBuf};

use foldicon_domain::IconApplicationRecord;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::effects::Effects;
use crate::store::RecordStore;
use crate::tooling::advisory::{Advisory, AdvisoryKind};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum RestoreState {
    Pending,
    Resolving,
    Verifying,
    Applying,
    Succeeded,
    Failed { reason: String },
}

impl RestoreState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, RestoreState::Succeeded | RestoreState::Failed { .. })
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreEntry {
    pub folder_path: String,
    pub icon_path: Option<PathBuf>,
    #[serde(flatten)]
    pub state: RestoreState,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub advisories: Vec<Advisory>,
}

impl RestoreEntry {
    fn new(folder_path: &str) -> Self {
        Self {
            folder_path: folder_path.to_string(),
            icon_path: None,
            state: RestoreState::Pending,
            advisories: Vec::new(),
        }
    }

    fn transition(&mut self, next: RestoreState) {
        debug!(folder = %self.folder_path, from = ?self.state, to = ?next, "restore transition");
        self.state = next;
    }

    fn fail(&mut self, reason: String) {
        warn!(folder = %self.folder_path, %reason, "restore failed");
        self.transition(RestoreState::Failed { reason });
    }

    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        match &self.state {
            RestoreState::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct RestoreSummary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    /// One `"<folderPath>: <reason>"` line per failed record.
    pub errors: Vec<String>,
    pub entries: Vec<RestoreEntry>,
}

/// Replays every record in `store` through the icon tool.
pub fn restore_all(store: &RecordStore, effects: &dyn Effects) -> RestoreSummary {
    let records = store.all();
    let mut summary = RestoreSummary {
        total: records.len(),
        ..RestoreSummary::default()
    };
    info!(total = summary.total, workspace = %store.workspace_root().display(), "restoring icons");

    for record in &records {
        let entry = restore_one(store, effects, record);
        match entry.failure_reason() {
            Some(reason) => {
                summary.failed += 1;
                summary
                    .errors
                    .push(format!("{}: {}", entry.folder_path, reason));
            }
            None => summary.success += 1,
        }
        summary.entries.push(entry);
    }

    info!(
        success = summary.success,
        failed = summary.failed,
        "restore finished"
    );
    summary
}

/// `record` must come from [`RecordStore::all`], so its folder path is
/// already denormalized.
fn restore_one(
    store: &RecordStore,
    effects: &dyn Effects,
    record: &IconApplicationRecord,
) -> RestoreEntry {
    let mut entry = RestoreEntry::new(&record.folder_path);

    entry.transition(RestoreState::Resolving);
    let icon = store.resolve_icon_path(record);
    entry.icon_path = Some(icon.clone());

    entry.transition(RestoreState::Verifying);
    let folder = Path::new(&record.folder_path);
    if let Err(reason) = verify(folder, &icon) {
        entry.fail(reason);
        return entry;
    }

    entry.transition(RestoreState::Applying);
    if let Err(err) = effects.icon_tool().set(folder, &icon) {
        entry.fail(err.reason());
        return entry;
    }
    if let Err(err) = effects.cache().refresh(folder) {
        entry
            .advisories
            .push(Advisory::raise(AdvisoryKind::CacheRefresh, folder, err));
    }
    entry.transition(RestoreState::Succeeded);
    entry
}

fn verify(folder: &Path, icon: &Path) -> Result<(), String> {
    if !icon.is_file() {
        return Err(format!("icon file not found: {}", icon.display()));
    }
    match folder.metadata() {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(format!("not a directory: {}", folder.display())),
        Err(_) => Err(format!("folder not found: {}", folder.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io;
    use std::sync::Mutex;

    use foldicon_domain::{NewApplication, UserContext};

    use crate::effects::{CacheRefresher, IconTool, IconToolError};

    #[derive(Default)]
    struct FakeEffects {
        calls: Mutex<Vec<(PathBuf, PathBuf)>>,
        fail_for: Option<PathBuf>,
        refresh_fails: bool,
    }

    impl IconTool for FakeEffects {
        fn set(&self, folder: &Path, icon: &Path) -> Result<(), IconToolError> {
            if self.fail_for.as_deref() == Some(folder) {
                return Err(IconToolError::Failed {
                    program: "fileicon".into(),
                    verb: "set",
                    code: 1,
                    stderr: "boom".into(),
                });
            }
            self.calls
                .lock()
                .expect("lock")
                .push((folder.to_path_buf(), icon.to_path_buf()));
            Ok(())
        }

        fn remove(&self, _folder: &Path) -> Result<(), IconToolError> {
            Ok(())
        }
    }

    impl CacheRefresher for FakeEffects {
        fn refresh(&self, _folder: &Path) -> io::Result<()> {
            if self.refresh_fails {
                Err(io::Error::other("touch failed"))
            } else {
                Ok(())
            }
        }
    }

    impl Effects for FakeEffects {
        fn icon_tool(&self) -> &dyn IconTool {
            self
        }

        fn cache(&self) -> &dyn CacheRefresher {
            self
        }
    }

    struct Fixture {
        _temp: tempfile::TempDir,
        home: PathBuf,
        store: RecordStore,
    }

    fn fixture() -> Fixture {
        let temp = tempfile::tempdir().expect("tempdir");
        let home = temp.path().join("home").join("alice");
        fs::create_dir_all(&home).expect("home");
        let user = UserContext::from_home(&home).expect("user");
        let store = RecordStore::open(&temp.path().join("ws"), user).expect("store");
        Fixture {
            _temp: temp,
            home,
            store,
        }
    }

    impl Fixture {
        /// Records `folder` (created when `make_folder`) with a fresh asset
        /// (written when `make_icon`).
        fn add(&mut self, name: &str, make_folder: bool, make_icon: bool, at: &str) -> PathBuf {
            let folder = self.home.join(name);
            if make_folder {
                fs::create_dir_all(&folder).expect("folder");
            }
            let relative = format!("applied-icons/{name}-1.png");
            if make_icon {
                fs::write(self.store.workspace_root().join(&relative), b"png").expect("icon");
            }
            self.store
                .record_application(NewApplication {
                    folder_path: folder.display().to_string(),
                    source_icon_name: format!("{name}.png"),
                    is_built_in: false,
                    icon_path: relative,
                    original_icon_path: None,
                    applied_at: at.to_string(),
                })
                .expect("record");
            folder
        }
    }

    #[test]
    fn restores_every_healthy_record() {
        let mut fx = fixture();
        let a = fx.add("a", true, true, "2024-01-01T00:00:00.000Z");
        let b = fx.add("b", true, true, "2024-02-01T00:00:00.000Z");
        let effects = FakeEffects::default();

        let summary = restore_all(&fx.store, &effects);
        assert_eq!((summary.total, summary.success, summary.failed), (2, 2, 0));
        assert!(summary.errors.is_empty());
        let calls = effects.calls.lock().expect("lock").clone();
        let folders: Vec<_> = calls.iter().map(|(folder, _)| folder.clone()).collect();
        assert_eq!(folders, vec![b, a], "newest first");
        assert!(calls
            .iter()
            .all(|(_, icon)| icon.starts_with(fx.store.workspace_root())));
    }

    #[test]
    fn missing_icon_or_folder_fails_only_that_record() {
        let mut fx = fixture();
        fx.add("ok", true, true, "2024-01-01T00:00:00.000Z");
        fx.add("no-icon", true, false, "2024-01-02T00:00:00.000Z");
        let gone = fx.add("no-folder", false, true, "2024-01-03T00:00:00.000Z");
        let effects = FakeEffects::default();

        let summary = restore_all(&fx.store, &effects);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.success + summary.failed, summary.total);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.errors.len(), summary.failed);
        assert!(summary.errors[0].starts_with(&format!("{}: folder not found", gone.display())));
        assert!(summary.errors[1].contains("icon file not found"));
        assert!(summary.errors[1].contains("applied-icons/no-icon-1.png"));
        assert_eq!(effects.calls.lock().expect("lock").len(), 1);
    }

    #[test]
    fn file_in_place_of_folder_is_rejected() {
        let mut fx = fixture();
        let path = fx.add("file", false, true, "2024-01-01T00:00:00.000Z");
        fs::write(&path, b"not a dir").expect("file");
        let summary = restore_all(&fx.store, &FakeEffects::default());
        assert_eq!(summary.failed, 1);
        assert!(summary.errors[0].contains("not a directory"));
    }

    #[test]
    fn tool_failure_is_isolated() {
        let mut fx = fixture();
        let bad = fx.add("bad", true, true, "2024-01-02T00:00:00.000Z");
        fx.add("good", true, true, "2024-01-01T00:00:00.000Z");
        let effects = FakeEffects {
            fail_for: Some(bad),
            ..FakeEffects::default()
        };
        let summary = restore_all(&fx.store, &effects);
        assert_eq!((summary.success, summary.failed), (1, 1));
        assert!(summary.errors[0].contains("boom"));
        assert_eq!(
            summary.entries[1].state,
            RestoreState::Succeeded,
            "later records still run"
        );
    }

    #[test]
    fn refresh_failure_is_advisory() {
        let mut fx = fixture();
        fx.add("a", true, true, "2024-01-01T00:00:00.000Z");
        let effects = FakeEffects {
            refresh_fails: true,
            ..FakeEffects::default()
        };
        let summary = restore_all(&fx.store, &effects);
        assert_eq!(summary.success, 1);
        let entry = &summary.entries[0];
        assert!(entry.state.is_terminal());
        assert_eq!(entry.advisories.len(), 1);
        assert_eq!(entry.advisories[0].kind, AdvisoryKind::CacheRefresh);
    }

    #[test]
    fn empty_store_restores_nothing() {
        let fx = fixture();
        let summary = restore_all(&fx.store, &FakeEffects::default());
        assert_eq!((summary.total, summary.success, summary.failed), (0, 0, 0));
    }

    #[test]
    fn entries_serialize_flat() {
        let mut entry = RestoreEntry::new("/x");
        entry.fail("icon file not found: /y".into());
        let value = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(value["state"], "failed");
        assert_eq!(value["reason"], "icon file not found: /y");
        assert_eq!(value["folderPath"], "/x");
    }
}
