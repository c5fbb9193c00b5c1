//! The user's saved preferences (`config.json`).

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub workspace_path: PathBuf,
    /// Keys written by other versions, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppConfig {
    fn with_defaults(default_workspace: &Path) -> Self {
        Self {
            workspace_path: default_workspace.to_path_buf(),
            extra: Map::new(),
        }
    }

    /// Lays whatever `raw` holds over the defaults; anything unusable is
    /// ignored.
    fn merged(raw: Value, default_workspace: &Path) -> Self {
        let mut config = Self::with_defaults(default_workspace);
        let Value::Object(mut map) = raw else {
            return config;
        };
        match map.remove("workspacePath") {
            Some(Value::String(path)) if !path.trim().is_empty() => {
                config.workspace_path = PathBuf::from(path);
            }
            Some(other) => warn!(value = %other, "ignoring invalid workspacePath"),
            None => {}
        }
        config.extra = map;
        config
    }
}

#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    config: AppConfig,
}

impl ConfigStore {
    /// Reads `<config_dir>/config.json`. A missing or malformed file yields
    /// defaults, which are written back.
    #[must_use]
    pub fn load(config_dir: &Path, default_workspace: &Path) -> Self {
        let path = config_dir.join(CONFIG_FILE_NAME);
        let loaded = fs::read_to_string(&path)
            .map_err(|err| err.to_string())
            .and_then(|contents| {
                serde_json::from_str::<Value>(&contents).map_err(|err| err.to_string())
            });
        let (config, needs_write) = match loaded {
            Ok(raw) => {
                let needs_write = raw.get("workspacePath").and_then(Value::as_str).is_none();
                (AppConfig::merged(raw, default_workspace), needs_write)
            }
            Err(reason) => {
                if path.exists() {
                    warn!(path = %path.display(), %reason, "config unreadable, using defaults");
                } else {
                    debug!(path = %path.display(), "no saved config, using defaults");
                }
                (AppConfig::with_defaults(default_workspace), true)
            }
        };
        let store = Self { path, config };
        if needs_write {
            if let Err(err) = store.save() {
                warn!(error = %err, "failed to save default config");
            }
        }
        store
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn workspace_path(&self) -> &Path {
        &self.config.workspace_path
    }

    /// Persists a new workspace path. The in-memory value only changes if
    /// the write succeeds.
    ///
    /// # Errors
    /// Returns an error when the config file cannot be written.
    pub fn update_workspace_path(&mut self, path: &Path) -> Result<()> {
        let previous = std::mem::replace(&mut self.config.workspace_path, path.to_path_buf());
        if let Err(err) = self.save() {
            self.config.workspace_path = previous;
            return Err(err);
        }
        info!(workspace = %path.display(), "saved workspace path");
        Ok(())
    }

    /// # Errors
    /// Returns an error when the config directory or file cannot be written.
    pub fn save(&self) -> Result<()> {
        let dir = self
            .path
            .parent()
            .context("config path has no parent directory")?;
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
        let mut json = serde_json::to_vec_pretty(&self.config)?;
        json.push(b'\n');
        let mut tmp = tempfile::Builder::new()
            .prefix(".config")
            .suffix(".tmp")
            .tempfile_in(dir)
            .with_context(|| format!("failed to stage config in {}", dir.display()))?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        debug!(path = %self.path.display(), "saved config");
        Ok(())
    }
}
