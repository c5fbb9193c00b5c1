use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdvisoryKind {
    CacheRefresh,
    AssetCleanup,
}

/// A non-critical side effect that failed without failing its operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub path: PathBuf,
    pub message: String,
}

impl Advisory {
    /// Builds the advisory and logs it at `warn`.
    pub fn raise(kind: AdvisoryKind, path: &Path, error: impl fmt::Display) -> Self {
        let message = error.to_string();
        warn!(?kind, path = %path.display(), %message, "non-critical operation failed");
        Self {
            kind,
            path: path.to_path_buf(),
            message,
        }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            AdvisoryKind::CacheRefresh => "cache refresh",
            AdvisoryKind::AssetCleanup => "asset cleanup",
        };
        write!(f, "{label} failed for {}: {}", self.path.display(), self.message)
    }
}
