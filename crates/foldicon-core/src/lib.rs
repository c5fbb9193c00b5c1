#![deny(clippy::all, warnings)]

mod core;

pub(crate) use crate::core::config;
pub(crate) use crate::core::config::context;
pub(crate) use crate::core::runtime::effects;
pub(crate) use crate::core::{restore, runtime, store, tooling};

pub use crate::core::commands::{
    apply_icon, list_icons, path_denormalize, path_normalize, remove_icon, restore_icons,
    show_icon, workspace_set, workspace_show, ApplyRequest, PathRequest, RemoveRequest,
    ShowRequest, WorkspaceSetRequest,
};
pub use crate::core::config::context::{AppContext, WorkspaceBinding, WorkspaceSource};
pub use crate::core::config::{
    default_workspace, AppConfig, Config, ConfigStore, GlobalOptions, CONFIG_DIR_ENV,
    FALLBACK_ICON_ENV, ICON_TOOL_ENV, WORKSPACE_ENV,
};
pub use crate::core::runtime::absolutize;
pub use crate::core::restore::{restore_all, RestoreEntry, RestoreState, RestoreSummary};
pub use crate::core::runtime::effects::{
    CacheRefresher, Effects, IconTool, IconToolError, SharedEffects, SystemEffects,
    DEFAULT_ICON_TOOL,
};
pub use crate::core::runtime::process::RunOutput;
pub use crate::core::store::{
    managed_file_name, sanitize_icon_name, AssetError, AssetManager, IconSource,
    MaterializedSource, RecordStore, RecordedApplication, RemoveOutcome, StoreError,
    DB_FILE_NAME,
};
pub use crate::core::tooling::advisory::{Advisory, AdvisoryKind};
pub use crate::core::tooling::outcome::{
    format_status_message, to_json_response, CommandGroup, CommandInfo, CommandStatus,
    ExecutionOutcome,
};
