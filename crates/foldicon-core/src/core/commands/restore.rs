use anyhow::Result;

use crate::context::AppContext;
use crate::restore::restore_all;
use crate::ExecutionOutcome;

/// Reapplies every recorded icon. Any failed entry makes the whole outcome a
/// failure; the details still carry every entry.
///
/// # Errors
/// Returns an error if the summary cannot be encoded.
pub fn restore_icons(ctx: &AppContext) -> Result<ExecutionOutcome> {
    let summary = restore_all(ctx.store(), ctx.effects());
    let details = serde_json::to_value(&summary)?;
    if summary.failed == 0 {
        let message = match summary.total {
            0 => "no icons to restore".to_string(),
            1 => "restored 1 icon".to_string(),
            n => format!("restored {n} icons"),
        };
        return Ok(ExecutionOutcome::success(message, details));
    }
    let mut message = format!(
        "restored {} of {} icons; {} failed",
        summary.success, summary.total, summary.failed
    );
    for line in &summary.errors {
        message.push_str("\n  ");
        message.push_str(line);
    }
    Ok(ExecutionOutcome::failure(message, details))
}
