use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::paths::UserContext;

/// Directory under the workspace root holding managed icon copies.
pub const APPLIED_ICONS_DIR: &str = "applied-icons";

/// Where a record's icon copy lives.
///
/// New records always hold a workspace-relative path. Older stores wrote the
/// absolute (normalized) path of the copy instead; both shapes are read.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IconAssetRef {
    Relative(String),
    LegacyAbsolute(String),
}

impl IconAssetRef {
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        if is_absolute_str(raw) {
            IconAssetRef::LegacyAbsolute(raw.to_string())
        } else {
            IconAssetRef::Relative(raw.to_string())
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            IconAssetRef::Relative(path) | IconAssetRef::LegacyAbsolute(path) => path,
        }
    }

    #[must_use]
    pub fn is_relative(&self) -> bool {
        matches!(self, IconAssetRef::Relative(_))
    }

    /// Absolute location of the asset for the live workspace and user.
    #[must_use]
    pub fn resolve(&self, workspace_root: &Path, user: &UserContext) -> PathBuf {
        match self {
            IconAssetRef::Relative(path) => workspace_root.join(path),
            IconAssetRef::LegacyAbsolute(path) => PathBuf::from(user.denormalize(path)),
        }
    }

    /// Form written to disk: relative paths as-is, absolute ones normalized.
    #[must_use]
    pub fn normalized(&self, user: &UserContext) -> Self {
        match self {
            Self::Relative(_) => self.clone(),
            Self::LegacyAbsolute(path) => Self::LegacyAbsolute(user.normalize(path)),
        }
    }

    /// Form handed to callers: relative paths as-is, absolute ones
    /// denormalized for `user`.
    #[must_use]
    pub fn denormalized(&self, user: &UserContext) -> Self {
        match self {
            Self::Relative(_) => self.clone(),
            Self::LegacyAbsolute(path) => Self::LegacyAbsolute(user.denormalize(path)),
        }
    }
}

impl From<String> for IconAssetRef {
    fn from(raw: String) -> Self {
        if is_absolute_str(&raw) {
            IconAssetRef::LegacyAbsolute(raw)
        } else {
            IconAssetRef::Relative(raw)
        }
    }
}

impl From<IconAssetRef> for String {
    fn from(asset: IconAssetRef) -> Self {
        match asset {
            IconAssetRef::Relative(path) | IconAssetRef::LegacyAbsolute(path) => path,
        }
    }
}

impl fmt::Display for IconAssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `/`-rooted or `X:\`-rooted.
#[must_use]
pub fn is_absolute_str(raw: &str) -> bool {
    if raw.starts_with('/') {
        return true;
    }
    let bytes = raw.as_bytes();
    bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'\\'
}
