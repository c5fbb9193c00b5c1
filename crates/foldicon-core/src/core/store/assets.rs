use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use foldicon_domain::{contains_placeholder, IconAssetRef, UserContext, APPLIED_ICONS_DIR};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::errors::AssetError;
use crate::tooling::advisory::{Advisory, AdvisoryKind};

const DEFAULT_EXTENSION: &str = "png";
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Where an icon to apply comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IconSource {
    File(PathBuf),
    /// `data:<mime>;base64,<payload>`
    DataUrl(String),
}

impl IconSource {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("data:") {
            IconSource::DataUrl(raw.to_string())
        } else {
            IconSource::File(PathBuf::from(raw))
        }
    }

    /// Name shown to the user when none is given explicitly.
    #[must_use]
    pub fn default_name(&self) -> String {
        match self {
            IconSource::File(path) => path
                .file_name()
                .map_or_else(|| "icon".to_string(), |name| name.to_string_lossy().into_owned()),
            IconSource::DataUrl(url) => format!("icon.{}", data_url_extension(url)),
        }
    }
}

/// A readable icon file, possibly a temp file kept alive by this value.
#[derive(Debug)]
pub struct MaterializedSource {
    path: PathBuf,
    temp: Option<NamedTempFile>,
}

impl MaterializedSource {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }
}

/// Copies icons into `<workspace>/applied-icons/` and hands back
/// workspace-relative paths.
#[derive(Clone, Debug)]
pub struct AssetManager {
    root: PathBuf,
    applied_icons: PathBuf,
    user: UserContext,
    fallback_icon: Option<PathBuf>,
}

impl AssetManager {
    #[must_use]
    pub fn new(root: &Path, user: UserContext, fallback_icon: Option<PathBuf>) -> Self {
        Self {
            root: root.to_path_buf(),
            applied_icons: root.join(APPLIED_ICONS_DIR),
            user,
            fallback_icon,
        }
    }

    #[must_use]
    pub fn applied_icons_dir(&self) -> &Path {
        &self.applied_icons
    }

    /// Turns an [`IconSource`] into a readable file. Data URLs are decoded
    /// into a temp file that lives as long as the returned value.
    ///
    /// # Errors
    /// Returns [`AssetError`] for malformed data URLs or temp file failures.
    pub fn materialize(&self, source: &IconSource) -> Result<MaterializedSource, AssetError> {
        match source {
            IconSource::File(path) => Ok(MaterializedSource {
                path: path.clone(),
                temp: None,
            }),
            IconSource::DataUrl(url) => {
                let bytes = decode_data_url(url)?;
                let suffix = format!(".{}", data_url_extension(url));
                let write_err = |source: io::Error| AssetError::Write {
                    path: std::env::temp_dir(),
                    source,
                };
                let mut temp = tempfile::Builder::new()
                    .prefix("foldicon-")
                    .suffix(&suffix)
                    .tempfile()
                    .map_err(write_err)?;
                temp.write_all(&bytes).map_err(write_err)?;
                temp.flush().map_err(write_err)?;
                debug!(path = %temp.path().display(), bytes = bytes.len(), "decoded data URL icon");
                Ok(MaterializedSource {
                    path: temp.path().to_path_buf(),
                    temp: Some(temp),
                })
            }
        }
    }

    /// Copies `source` under a fresh name in the managed directory and
    /// returns its workspace-relative path (`applied-icons/<file>`).
    ///
    /// Falls back once to the platform's generic document icon when the
    /// source cannot be read. Every call produces a new file.
    ///
    /// # Errors
    /// Returns [`AssetError`] when neither the source nor the fallback can be
    /// read, or the copy cannot be written.
    pub fn copy_to_managed(&self, source: &Path, icon_name: &str) -> Result<String, AssetError> {
        let source = self.actual_source(source);
        let bytes = self.read_with_fallback(&source)?;

        fs::create_dir_all(&self.applied_icons).map_err(|err| AssetError::Write {
            path: self.applied_icons.clone(),
            source: err,
        })?;

        let stem = sanitize_icon_name(icon_name);
        let extension = source_extension(&source);
        let mut millis = unix_millis();
        let mut attempts = 0;
        let (file_name, mut file) = loop {
            let file_name = managed_file_name(&stem, millis, &extension);
            let dest = self.applied_icons.join(&file_name);
            match OpenOptions::new().write(true).create_new(true).open(&dest) {
                Ok(file) => break (file_name, file),
                Err(err)
                    if err.kind() == io::ErrorKind::AlreadyExists
                        && attempts < MAX_NAME_ATTEMPTS =>
                {
                    attempts += 1;
                    millis += 1;
                }
                Err(err) => return Err(AssetError::Write { path: dest, source: err }),
            }
        };
        let dest = self.applied_icons.join(&file_name);
        if let Err(err) = file.write_all(&bytes).and_then(|()| file.sync_all()) {
            let _ = fs::remove_file(&dest);
            return Err(AssetError::Write {
                path: dest,
                source: err,
            });
        }
        debug!(from = %source.display(), to = %dest.display(), "copied icon into workspace");
        Ok(format!("{APPLIED_ICONS_DIR}/{file_name}"))
    }

    #[must_use]
    pub fn resolve(&self, asset: &IconAssetRef) -> PathBuf {
        asset.resolve(&self.root, &self.user)
    }

    /// Best-effort removal of a managed copy.
    pub fn delete_asset(&self, asset: &IconAssetRef) -> Option<Advisory> {
        delete_managed_asset(&self.resolve(asset))
    }

    fn actual_source(&self, source: &Path) -> PathBuf {
        let raw = source.to_string_lossy();
        if contains_placeholder(&raw) {
            PathBuf::from(self.user.denormalize(&raw))
        } else {
            source.to_path_buf()
        }
    }

    fn read_with_fallback(&self, source: &Path) -> Result<Vec<u8>, AssetError> {
        let err = match fs::read(source) {
            Ok(bytes) => return Ok(bytes),
            Err(err) => err,
        };
        warn!(path = %source.display(), error = %err, "icon source unreadable");
        if let Some(fallback) = self.fallback_icon.as_deref().filter(|path| path.is_file()) {
            if let Ok(bytes) = fs::read(fallback) {
                warn!(fallback = %fallback.display(), "using generic document icon instead");
                return Ok(bytes);
            }
        }
        Err(AssetError::SourceUnreadable {
            path: source.to_path_buf(),
            source: err,
        })
    }
}

/// Removes `path` if present. A missing file is logged; any other failure
/// becomes an [`Advisory`].
pub(crate) fn delete_managed_asset(path: &Path) -> Option<Advisory> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "deleted icon copy");
            None
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "icon copy already gone");
            None
        }
        Err(err) => Some(Advisory::raise(AdvisoryKind::AssetCleanup, path, err)),
    }
}

/// Keeps `[A-Za-z0-9-_]`, drops everything else.
#[must_use]
pub fn sanitize_icon_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_')
        .collect();
    if cleaned.is_empty() {
        "icon".to_string()
    } else {
        cleaned
    }
}

#[must_use]
pub fn managed_file_name(stem: &str, millis: u128, extension: &str) -> String {
    format!("{stem}-{millis}.{extension}")
}

fn source_extension(source: &Path) -> String {
    source
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .unwrap_or(DEFAULT_EXTENSION)
        .to_string()
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis())
}

fn decode_data_url(url: &str) -> Result<Vec<u8>, AssetError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| AssetError::InvalidDataUrl("missing `data:` prefix".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| AssetError::InvalidDataUrl("missing `,` before payload".into()))?;
    if !meta.split(';').any(|part| part.eq_ignore_ascii_case("base64")) {
        return Err(AssetError::InvalidDataUrl(
            "only base64-encoded data URLs are supported".into(),
        ));
    }
    if payload.is_empty() {
        return Err(AssetError::InvalidDataUrl("empty payload".into()));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|err| AssetError::InvalidDataUrl(err.to_string()))
}

fn data_url_extension(url: &str) -> &'static str {
    let mime = url
        .strip_prefix("data:")
        .and_then(|rest| rest.split([';', ',']).next())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match mime.as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/x-icns" | "image/icns" => "icns",
        "image/svg+xml" => "svg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => DEFAULT_EXTENSION,
    }
}
