use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use filetime::{set_file_mtime, FileTime};
use tracing::debug;

use super::process::{run_command, RunOutput};
use crate::config::Config;

pub const DEFAULT_ICON_TOOL: &str = "fileicon";

/// Failures of the external icon-setting executable.
#[derive(Debug, thiserror::Error)]
pub enum IconToolError {
    #[error("[FI300] icon tool `{program}` was not found")]
    MissingExecutable { program: String },
    #[error("[FI301] failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("[FI302] `{program} {verb}` exited with code {code}: {stderr}")]
    Failed {
        program: String,
        verb: &'static str,
        code: i32,
        stderr: String,
    },
}

impl IconToolError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            IconToolError::MissingExecutable { .. } => "FI300",
            IconToolError::Spawn { .. } => "FI301",
            IconToolError::Failed { .. } => "FI302",
        }
    }

    /// Short human reason, without the error code.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            IconToolError::MissingExecutable { program } => {
                format!("icon tool `{program}` was not found")
            }
            IconToolError::Spawn { program, source } => {
                format!("failed to start `{program}`: {source}")
            }
            IconToolError::Failed {
                program,
                verb,
                code,
                stderr,
            } => {
                let stderr = stderr.trim();
                if stderr.is_empty() {
                    format!("`{program} {verb}` exited with code {code}")
                } else {
                    format!("`{program} {verb}` exited with code {code}: {stderr}")
                }
            }
        }
    }
}

/// The folder-icon executable: `set <folder> <icon>` and `rm <folder>`.
pub trait IconTool: Send + Sync {
    fn set(&self, folder: &Path, icon: &Path) -> Result<(), IconToolError>;
    fn remove(&self, folder: &Path) -> Result<(), IconToolError>;
}

/// Nudges the desktop into re-reading a folder's icon.
pub trait CacheRefresher: Send + Sync {
    fn refresh(&self, folder: &Path) -> io::Result<()>;
}

pub trait Effects: Send + Sync {
    fn icon_tool(&self) -> &dyn IconTool;
    fn cache(&self) -> &dyn CacheRefresher;
}

pub type SharedEffects = Arc<dyn Effects>;

pub struct SystemEffects {
    icon_tool: Arc<SystemIconTool>,
    cache: Arc<TouchRefresher>,
}

impl SystemEffects {
    #[must_use]
    pub fn new() -> Self {
        Self::with_program(DEFAULT_ICON_TOOL)
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::with_program(config.icon_tool())
    }

    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            icon_tool: Arc::new(SystemIconTool {
                program: program.into(),
            }),
            cache: Arc::new(TouchRefresher),
        }
    }
}

impl Default for SystemEffects {
    fn default() -> Self {
        Self::new()
    }
}

impl Effects for SystemEffects {
    fn icon_tool(&self) -> &dyn IconTool {
        self.icon_tool.as_ref()
    }

    fn cache(&self) -> &dyn CacheRefresher {
        self.cache.as_ref()
    }
}

struct SystemIconTool {
    program: String,
}

impl SystemIconTool {
    fn locate(&self) -> Result<PathBuf, IconToolError> {
        let missing = || IconToolError::MissingExecutable {
            program: self.program.clone(),
        };
        if self.program.contains('/') {
            let path = PathBuf::from(&self.program);
            return if path.is_file() { Ok(path) } else { Err(missing()) };
        }
        which::which(&self.program).map_err(|_| missing())
    }

    fn invoke(&self, verb: &'static str, operands: &[&Path]) -> Result<RunOutput, IconToolError> {
        let program = self.locate()?;
        let mut args = Vec::with_capacity(operands.len() + 1);
        args.push(verb.to_string());
        args.extend(
            operands
                .iter()
                .map(|path| path.to_string_lossy().into_owned()),
        );
        debug!(program = %program.display(), ?args, "invoking icon tool");
        let output = run_command(&program, &args).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                IconToolError::MissingExecutable {
                    program: self.program.clone(),
                }
            } else {
                IconToolError::Spawn {
                    program: self.program.clone(),
                    source: err,
                }
            }
        })?;
        if output.success() {
            Ok(output)
        } else {
            Err(IconToolError::Failed {
                program: self.program.clone(),
                verb,
                code: output.code,
                stderr: output.stderr,
            })
        }
    }
}

impl IconTool for SystemIconTool {
    fn set(&self, folder: &Path, icon: &Path) -> Result<(), IconToolError> {
        self.invoke("set", &[folder, icon]).map(|_| ())
    }

    fn remove(&self, folder: &Path) -> Result<(), IconToolError> {
        self.invoke("rm", &[folder]).map(|_| ())
    }
}

/// Equivalent of `touch <folder>`.
struct TouchRefresher;

impl CacheRefresher for TouchRefresher {
    fn refresh(&self, folder: &Path) -> io::Result<()> {
        set_file_mtime(folder, FileTime::now())
    }
}
