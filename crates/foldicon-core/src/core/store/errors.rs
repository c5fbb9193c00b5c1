use std::io;
use std::path::PathBuf;

/// Storage failures. After one of these the store must be reopened before
/// further use.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("[FI100] failed to create workspace directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("[FI101] failed to write record store {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("[FI102] failed to encode record store: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::CreateDir { .. } => "FI100",
            StoreError::Write { .. } => "FI101",
            StoreError::Encode(_) => "FI102",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("[FI200] icon source {path} could not be read: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("[FI201] invalid icon data URL: {0}")]
    InvalidDataUrl(String),
    #[error("[FI202] failed to write managed icon {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl AssetError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            AssetError::SourceUnreadable { .. } => "FI200",
            AssetError::InvalidDataUrl(_) => "FI201",
            AssetError::Write { .. } => "FI202",
        }
    }
}
