use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use foldicon_domain::UserContext;

use crate::effects::DEFAULT_ICON_TOOL;

pub const CONFIG_DIR_ENV: &str = "FOLDICON_CONFIG_DIR";
pub const WORKSPACE_ENV: &str = "FOLDICON_WORKSPACE";
pub const ICON_TOOL_ENV: &str = "FOLDICON_ICON_TOOL";
pub const FALLBACK_ICON_ENV: &str = "FOLDICON_FALLBACK_ICON";

#[cfg(target_os = "macos")]
const PLATFORM_FALLBACK_ICON: &str =
    "/System/Library/CoreServices/CoreTypes.bundle/Contents/Resources/GenericDocumentIcon.icns";
#[cfg(not(target_os = "macos"))]
const PLATFORM_FALLBACK_ICON: &str =
    "/usr/share/icons/Adwaita/scalable/mimetypes/text-x-generic.svg";

#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// `--workspace`: use this workspace for one invocation without
    /// touching the saved configuration.
    pub workspace: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub(crate) struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub(crate) fn capture() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }

    pub(crate) fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Like [`Self::var`], but treats an empty value as unset.
    pub(crate) fn non_empty(&self, key: &str) -> Option<&str> {
        self.var(key).filter(|value| !value.trim().is_empty())
    }

    #[cfg(test)]
    pub(crate) fn testing(pairs: &[(&str, &str)]) -> Self {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self { vars }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) icon_tool: String,
    pub(crate) config_dir: PathBuf,
    pub(crate) workspace_override: Option<PathBuf>,
    pub(crate) fallback_icon: Option<PathBuf>,
    pub(crate) default_workspace: PathBuf,
}

impl Config {
    /// Builds a configuration snapshot from the current process environment.
    #[must_use]
    pub fn from_env(user: &UserContext) -> Self {
        Self::from_snapshot(&EnvSnapshot::capture(), user)
    }

    pub(crate) fn from_snapshot(snapshot: &EnvSnapshot, user: &UserContext) -> Self {
        let config_dir = snapshot.non_empty(CONFIG_DIR_ENV).map_or_else(
            || default_config_dir(user.home()),
            PathBuf::from,
        );
        // An explicitly empty value disables the fallback icon.
        let fallback_icon = match snapshot.var(FALLBACK_ICON_ENV) {
            Some(value) if value.trim().is_empty() => None,
            Some(value) => Some(PathBuf::from(value)),
            None => Some(PathBuf::from(PLATFORM_FALLBACK_ICON)),
        };
        Self {
            icon_tool: snapshot
                .non_empty(ICON_TOOL_ENV)
                .unwrap_or(DEFAULT_ICON_TOOL)
                .to_string(),
            config_dir,
            workspace_override: snapshot.non_empty(WORKSPACE_ENV).map(PathBuf::from),
            fallback_icon,
            default_workspace: default_workspace(user.home()),
        }
    }

    #[must_use]
    pub fn icon_tool(&self) -> &str {
        &self.icon_tool
    }

    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    #[must_use]
    pub fn workspace_override(&self) -> Option<&Path> {
        self.workspace_override.as_deref()
    }

    #[must_use]
    pub fn fallback_icon(&self) -> Option<&Path> {
        self.fallback_icon.as_deref()
    }

    #[must_use]
    pub fn default_workspace(&self) -> &Path {
        &self.default_workspace
    }
}

fn default_config_dir(home: &Path) -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| home.join(".config"))
        .join("foldicon")
}

/// `<home>/Documents/themes/folder-icons`
#[must_use]
pub fn default_workspace(home: &Path) -> PathBuf {
    home.join("Documents").join("themes").join("folder-icons")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> UserContext {
        UserContext::from_home("/home/alice").expect("user")
    }

    #[test]
    fn defaults_without_environment() {
        let config = Config::from_snapshot(&EnvSnapshot::testing(&[]), &alice());
        assert_eq!(config.icon_tool(), "fileicon");
        assert!(config.workspace_override().is_none());
        assert_eq!(
            config.default_workspace(),
            Path::new("/home/alice/Documents/themes/folder-icons")
        );
        assert_eq!(
            config.fallback_icon(),
            Some(Path::new(PLATFORM_FALLBACK_ICON))
        );
        assert!(config.config_dir().ends_with("foldicon"));
    }

    #[test]
    fn environment_overrides() {
        let snapshot = EnvSnapshot::testing(&[
            (CONFIG_DIR_ENV, "/tmp/cfg"),
            (WORKSPACE_ENV, "/tmp/ws"),
            (ICON_TOOL_ENV, "/opt/bin/fileicon"),
            (FALLBACK_ICON_ENV, "/tmp/generic.png"),
        ]);
        let config = Config::from_snapshot(&snapshot, &alice());
        assert_eq!(config.config_dir(), Path::new("/tmp/cfg"));
        assert_eq!(config.workspace_override(), Some(Path::new("/tmp/ws")));
        assert_eq!(config.icon_tool(), "/opt/bin/fileicon");
        assert_eq!(config.fallback_icon(), Some(Path::new("/tmp/generic.png")));
    }

    #[test]
    fn empty_values_behave_as_unset_except_fallback() {
        let snapshot = EnvSnapshot::testing(&[
            (WORKSPACE_ENV, ""),
            (ICON_TOOL_ENV, "  "),
            (FALLBACK_ICON_ENV, ""),
        ]);
        let config = Config::from_snapshot(&snapshot, &alice());
        assert!(config.workspace_override().is_none());
        assert_eq!(config.icon_tool(), "fileicon");
        assert!(config.fallback_icon().is_none());
    }
}
