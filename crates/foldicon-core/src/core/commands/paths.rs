use anyhow::Result;
use serde_json::json;

use crate::context::AppContext;
use crate::ExecutionOutcome;

#[derive(Clone, Debug)]
pub struct PathRequest {
    pub path: String,
}

/// Shows how a path is stored: the current user's home rewritten to
/// `{USER}`.
///
/// # Errors
/// Never fails.
pub fn path_normalize(ctx: &AppContext, request: &PathRequest) -> Result<ExecutionOutcome> {
    let output = ctx.user().normalize(&request.path);
    Ok(ExecutionOutcome::success(
        output.clone(),
        json!({
            "input": request.path,
            "output": output,
            "username": ctx.user().username(),
        }),
    ))
}

/// Expands `{USER}` to the current user's name.
///
/// # Errors
/// Never fails.
pub fn path_denormalize(ctx: &AppContext, request: &PathRequest) -> Result<ExecutionOutcome> {
    let output = ctx.user().denormalize(&request.path);
    Ok(ExecutionOutcome::success(
        output.clone(),
        json!({
            "input": request.path,
            "output": output,
            "username": ctx.user().username(),
        }),
    ))
}
