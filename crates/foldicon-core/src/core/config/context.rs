use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use foldicon_domain::UserContext;
use tracing::{info, warn};

use super::app_config::ConfigStore;
use crate::config::{Config, EnvSnapshot, GlobalOptions};
use crate::effects::{Effects, SharedEffects, SystemEffects};
use crate::runtime::absolutize;
use crate::store::{AssetManager, RecordStore, StoreError};

/// The record store and asset manager of one live workspace.
#[derive(Debug)]
pub struct WorkspaceBinding {
    store: RecordStore,
    assets: AssetManager,
}

impl WorkspaceBinding {
    /// # Errors
    /// Returns [`StoreError`] when the workspace cannot be created or its
    /// database cannot be written.
    pub fn open(
        root: &Path,
        user: &UserContext,
        fallback_icon: Option<PathBuf>,
    ) -> Result<Self, StoreError> {
        let store = RecordStore::open(root, user.clone())?;
        let assets = AssetManager::new(root, user.clone(), fallback_icon);
        Ok(Self { store, assets })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.store.workspace_root()
    }

    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    #[must_use]
    pub fn assets(&self) -> &AssetManager {
        &self.assets
    }
}

/// Where the live workspace came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkspaceSource {
    /// `--workspace` or `FOLDICON_WORKSPACE`.
    Override,
    Configured,
    /// The configured workspace could not be opened.
    DefaultFallback,
}

impl WorkspaceSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            WorkspaceSource::Override => "override",
            WorkspaceSource::Configured => "config",
            WorkspaceSource::DefaultFallback => "default-fallback",
        }
    }
}

/// Everything a command needs, with exactly one live workspace binding.
pub struct AppContext<'a> {
    pub global: &'a GlobalOptions,
    config: Config,
    settings: ConfigStore,
    user: UserContext,
    effects: SharedEffects,
    binding: WorkspaceBinding,
    source: WorkspaceSource,
}

impl<'a> AppContext<'a> {
    /// Creates a context for the current user and process environment, with
    /// the real icon tool named by the configuration.
    ///
    /// # Errors
    /// Returns an error if the home directory is unknown or no workspace
    /// can be opened.
    pub fn from_env(global: &'a GlobalOptions) -> Result<Self> {
        let user = current_user()?;
        let config = Config::from_snapshot(&EnvSnapshot::capture(), &user);
        let effects = Arc::new(SystemEffects::from_config(&config));
        Self::with_parts(global, config, user, effects)
    }

    /// # Errors
    /// See [`AppContext::from_env`].
    pub fn with_parts(
        global: &'a GlobalOptions,
        config: Config,
        user: UserContext,
        effects: SharedEffects,
    ) -> Result<Self> {
        let settings = ConfigStore::load(config.config_dir(), config.default_workspace());
        let (binding, source) = bind_initial(global, &config, &settings, &user)?;
        info!(
            workspace = %binding.root().display(),
            source = source.as_str(),
            "workspace bound"
        );
        Ok(Self {
            global,
            config,
            settings,
            user,
            effects,
            binding,
            source,
        })
    }

    pub fn effects(&self) -> &dyn Effects {
        self.effects.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn settings(&self) -> &ConfigStore {
        &self.settings
    }

    pub fn user(&self) -> &UserContext {
        &self.user
    }

    pub fn workspace(&self) -> &WorkspaceBinding {
        &self.binding
    }

    pub fn workspace_source(&self) -> WorkspaceSource {
        self.source
    }

    pub fn store(&self) -> &RecordStore {
        &self.binding.store
    }

    pub fn assets(&self) -> &AssetManager {
        &self.binding.assets
    }

    /// Split borrow for commands that mutate the store while copying assets
    /// and calling the icon tool.
    pub fn parts_mut(&mut self) -> (&mut RecordStore, &AssetManager, &dyn Effects) {
        (
            &mut self.binding.store,
            &self.binding.assets,
            self.effects.as_ref(),
        )
    }

    /// Opens `path` as the new workspace and saves it to the config. The old
    /// binding stays live if either step fails.
    ///
    /// # Errors
    /// Returns an error when the new workspace cannot be opened or the
    /// config cannot be saved.
    pub fn switch_workspace(&mut self, path: &Path) -> Result<&WorkspaceBinding> {
        let root = absolutize(path)?;
        let binding = WorkspaceBinding::open(&root, &self.user, self.fallback_icon())
            .with_context(|| format!("failed to open workspace {}", root.display()))?;
        self.settings.update_workspace_path(&root)?;
        let previous = std::mem::replace(&mut self.binding, binding);
        self.source = WorkspaceSource::Configured;
        info!(
            from = %previous.root().display(),
            to = %root.display(),
            "switched workspace"
        );
        Ok(&self.binding)
    }

    fn fallback_icon(&self) -> Option<PathBuf> {
        self.config.fallback_icon().map(Path::to_path_buf)
    }
}

fn current_user() -> Result<UserContext> {
    UserContext::current()
        .ok_or_else(|| anyhow!("cannot determine the home directory of the current user"))
}

fn bind_initial(
    global: &GlobalOptions,
    config: &Config,
    settings: &ConfigStore,
    user: &UserContext,
) -> Result<(WorkspaceBinding, WorkspaceSource)> {
    let fallback_icon = config.fallback_icon().map(Path::to_path_buf);
    let explicit = global
        .workspace
        .as_deref()
        .or_else(|| config.workspace_override());
    if let Some(path) = explicit {
        let root = absolutize(path)?;
        let binding = WorkspaceBinding::open(&root, user, fallback_icon)
            .with_context(|| format!("failed to open workspace {}", root.display()))?;
        return Ok((binding, WorkspaceSource::Override));
    }

    let configured = absolutize(settings.workspace_path())?;
    match WorkspaceBinding::open(&configured, user, fallback_icon.clone()) {
        Ok(binding) => Ok((binding, WorkspaceSource::Configured)),
        Err(err) if configured != config.default_workspace() => {
            warn!(
                workspace = %configured.display(),
                error = %err,
                "configured workspace unusable, falling back to default"
            );
            let default = config.default_workspace();
            let binding = WorkspaceBinding::open(default, user, fallback_icon)
                .with_context(|| format!("failed to open workspace {}", default.display()))?;
            Ok((binding, WorkspaceSource::DefaultFallback))
        }
        Err(err) => Err(err)
            .with_context(|| format!("failed to open workspace {}", configured.display())),
    }
}
