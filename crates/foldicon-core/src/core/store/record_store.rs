use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use foldicon_domain::{
    sort_newest_first, IconApplicationRecord, IconAssetRef, NewApplication, StoreDocument,
    UserContext, APPLIED_ICONS_DIR,
};
use tracing::{debug, info, warn};

use super::assets::delete_managed_asset;
use super::errors::StoreError;
use crate::tooling::advisory::Advisory;

pub const DB_FILE_NAME: &str = "icon-manager-db.json";

/// Result of [`RecordStore::record_application`].
#[derive(Clone, Debug)]
pub struct RecordedApplication {
    /// The record as persisted (normalized paths).
    pub record: IconApplicationRecord,
    /// The record it replaced, if the folder already had one.
    pub superseded: Option<IconApplicationRecord>,
}

#[derive(Clone, Debug)]
pub enum RemoveOutcome {
    Removed {
        record: IconApplicationRecord,
        advisories: Vec<Advisory>,
    },
    NotFound,
}

enum LoadedDocument {
    Present(StoreDocument),
    Missing,
    Unusable(String),
}

/// JSON-backed record of which icon was applied to which folder, bound to
/// one workspace directory. Every mutation is written through before it
/// returns.
#[derive(Debug)]
pub struct RecordStore {
    root: PathBuf,
    applied_icons: PathBuf,
    db_path: PathBuf,
    user: UserContext,
    document: StoreDocument,
}

impl RecordStore {
    /// Binds a store to `root`, creating the workspace layout and database
    /// file as needed. An unreadable or malformed database is replaced by
    /// an empty one.
    ///
    /// # Errors
    /// Returns [`StoreError`] when directories cannot be created or the
    /// initial database cannot be written.
    pub fn open(root: &Path, user: UserContext) -> Result<Self, StoreError> {
        let applied_icons = root.join(APPLIED_ICONS_DIR);
        ensure_dir(root)?;
        ensure_dir(&applied_icons)?;
        let db_path = root.join(DB_FILE_NAME);

        let (document, needs_write) = match load_document(&db_path) {
            LoadedDocument::Present(mut document) => {
                debug!(path = %db_path.display(), records = document.len(), "loaded record store");
                let behind = document.reconcile_last_id();
                if behind {
                    warn!(
                        path = %db_path.display(),
                        last_id = document.last_id,
                        "lastId behind stored ids, raised"
                    );
                }
                (document, behind)
            }
            LoadedDocument::Missing => {
                debug!(path = %db_path.display(), "creating empty record store");
                (StoreDocument::empty(), true)
            }
            LoadedDocument::Unusable(reason) => {
                warn!(path = %db_path.display(), %reason, "record store unusable, starting empty");
                (StoreDocument::empty(), true)
            }
        };

        let store = Self {
            root: root.to_path_buf(),
            applied_icons,
            db_path,
            user,
            document,
        };
        if needs_write {
            store.persist()?;
        }
        Ok(store)
    }

    #[must_use]
    pub fn workspace_root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn applied_icons_dir(&self) -> &Path {
        &self.applied_icons
    }

    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    #[must_use]
    pub fn user(&self) -> &UserContext {
        &self.user
    }

    #[must_use]
    pub fn last_id(&self) -> u64 {
        self.document.last_id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.document.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }

    /// Stores `info` as the record for its folder, replacing any previous
    /// record. The replaced record's asset is kept on disk and tracked in
    /// `superseded_icon_paths` until the folder's record is removed.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the database cannot be written; memory and
    /// disk are both left as they were.
    pub fn record_application(
        &mut self,
        info: NewApplication,
    ) -> Result<RecordedApplication, StoreError> {
        let folder_key = self.user.normalize(&info.folder_path);
        let icon_path = IconAssetRef::classify(&info.icon_path).normalized(&self.user);
        let original_icon_path = info
            .original_icon_path
            .as_deref()
            .map(|path| self.user.normalize(path));
        debug!(from = %info.folder_path, to = %folder_key, "normalized folder path");

        let snapshot = self.document.clone();
        let superseded_icon_paths = self
            .document
            .get(&folder_key)
            .map(|previous| {
                let mut carried = previous.superseded_icon_paths.clone();
                carried.push(previous.icon_path.clone());
                carried.retain(|asset| *asset != icon_path);
                carried
            })
            .unwrap_or_default();

        let record = IconApplicationRecord {
            id: self.document.next_id(),
            folder_path: folder_key.clone(),
            source_icon_name: info.source_icon_name,
            is_built_in: info.is_built_in,
            icon_path,
            original_icon_path,
            applied_at: info.applied_at,
            superseded_icon_paths,
        };
        let superseded = self.document.upsert(record.clone());

        if let Err(err) = self.persist() {
            self.document = snapshot;
            return Err(err);
        }
        info!(folder = %folder_key, id = record.id, "recorded icon application");
        Ok(RecordedApplication { record, superseded })
    }

    /// Deletes the record for `folder_path` and then, best-effort, its
    /// managed icon copies. Unknown folders are a no-op.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the database cannot be written; the
    /// record is kept in that case.
    pub fn remove_application(&mut self, folder_path: &str) -> Result<RemoveOutcome, StoreError> {
        let Some(key) = self.existing_key(folder_path) else {
            info!(folder = %folder_path, "no icon record to remove");
            return Ok(RemoveOutcome::NotFound);
        };
        let snapshot = self.document.clone();
        let Some(record) = self.document.remove(&key) else {
            return Ok(RemoveOutcome::NotFound);
        };
        if let Err(err) = self.persist() {
            self.document = snapshot;
            return Err(err);
        }
        info!(folder = %key, id = record.id, "removed icon record");

        let advisories = std::iter::once(&record.icon_path)
            .chain(record.superseded_icon_paths.iter())
            .filter_map(|asset| delete_managed_asset(&asset.resolve(&self.root, &self.user)))
            .collect();
        Ok(RemoveOutcome::Removed { record, advisories })
    }

    /// The stored record for a folder, looked up by normalized path first
    /// and by the raw path second.
    #[must_use]
    pub fn get_by_folder(&self, folder_path: &str) -> Option<&IconApplicationRecord> {
        self.existing_key(folder_path)
            .and_then(|key| self.document.get(&key))
    }

    /// Every record with its paths resolved for the current user, newest
    /// first. Relative icon paths are returned as-is.
    #[must_use]
    pub fn all(&self) -> Vec<IconApplicationRecord> {
        let mut records: Vec<_> = self
            .document
            .icon_applications
            .values()
            .map(|record| self.denormalized(record))
            .collect();
        sort_newest_first(&mut records);
        records
    }

    /// Copy of `record` with folder, legacy icon, and original icon paths
    /// rewritten for the current user.
    #[must_use]
    pub fn denormalized(&self, record: &IconApplicationRecord) -> IconApplicationRecord {
        IconApplicationRecord {
            folder_path: self.user.denormalize(&record.folder_path),
            icon_path: record.icon_path.denormalized(&self.user),
            original_icon_path: record
                .original_icon_path
                .as_deref()
                .map(|path| self.user.denormalize(path)),
            superseded_icon_paths: record
                .superseded_icon_paths
                .iter()
                .map(|asset| asset.denormalized(&self.user))
                .collect(),
            ..record.clone()
        }
    }

    /// Absolute location of a record's icon copy in the live workspace.
    #[must_use]
    pub fn resolve_icon_path(&self, record: &IconApplicationRecord) -> PathBuf {
        record.icon_path.resolve(&self.root, &self.user)
    }

    fn existing_key(&self, folder_path: &str) -> Option<String> {
        let normalized = self.user.normalize(folder_path);
        if self.document.get(&normalized).is_some() {
            return Some(normalized);
        }
        if self.document.get(folder_path).is_some() {
            debug!(folder = %folder_path, "matched record by raw folder path");
            return Some(folder_path.to_string());
        }
        None
    }

    fn persist(&self) -> Result<(), StoreError> {
        let mut json = serde_json::to_vec_pretty(&self.document)?;
        json.push(b'\n');
        let write_err = |source: io::Error| StoreError::Write {
            path: self.db_path.clone(),
            source,
        };
        let mut tmp = tempfile::Builder::new()
            .prefix(".icon-manager-db")
            .suffix(".tmp")
            .tempfile_in(&self.root)
            .map_err(write_err)?;
        tmp.write_all(&json).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.db_path)
            .map_err(|err| write_err(err.error))?;
        debug!(path = %self.db_path.display(), "saved record store");
        Ok(())
    }
}

fn ensure_dir(path: &Path) -> Result<(), StoreError> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|source| StoreError::CreateDir {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "created directory");
    Ok(())
}

fn load_document(path: &Path) -> LoadedDocument {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return LoadedDocument::Missing,
        Err(err) => return LoadedDocument::Unusable(err.to_string()),
    };
    match serde_json::from_str(&contents) {
        Ok(document) => LoadedDocument::Present(document),
        Err(err) => LoadedDocument::Unusable(err.to_string()),
    }
}
