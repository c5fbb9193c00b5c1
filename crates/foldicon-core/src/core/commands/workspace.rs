use std::path::PathBuf;

use anyhow::Result;
use serde_json::{json, Value};

use crate::context::AppContext;
use crate::ExecutionOutcome;

#[derive(Clone, Debug)]
pub struct WorkspaceSetRequest {
    pub path: PathBuf,
}

fn workspace_details(ctx: &AppContext) -> Value {
    let binding = ctx.workspace();
    json!({
        "path": binding.root(),
        "source": ctx.workspace_source().as_str(),
        "database": binding.store().db_path(),
        "appliedIcons": binding.store().applied_icons_dir(),
        "records": binding.store().len(),
        "config": ctx.settings().path(),
        "defaultWorkspace": ctx.config().default_workspace(),
    })
}

/// # Errors
/// Never fails.
pub fn workspace_show(ctx: &AppContext) -> Result<ExecutionOutcome> {
    Ok(ExecutionOutcome::success(
        ctx.workspace().root().display().to_string(),
        workspace_details(ctx),
    ))
}

/// Binds a new workspace and saves it as the default for later runs.
///
/// # Errors
/// Returns an error only for unexpected failures; an unusable workspace is
/// reported as a failed outcome and the previous one stays bound.
pub fn workspace_set(
    ctx: &mut AppContext,
    request: &WorkspaceSetRequest,
) -> Result<ExecutionOutcome> {
    let switched = ctx.switch_workspace(&request.path).map(|_| ());
    if let Err(err) = switched {
        return Ok(ExecutionOutcome::failure(
            format!("failed to switch workspace to {}", request.path.display()),
            json!({
                "reason": format!("{err:#}"),
                "workspace": ctx.workspace().root(),
            }),
        ));
    }
    Ok(ExecutionOutcome::success(
        format!("workspace set to {}", ctx.workspace().root().display()),
        workspace_details(ctx),
    ))
}
