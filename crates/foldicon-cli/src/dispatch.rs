use color_eyre::Result;
use foldicon_core::{
    AppContext, ApplyRequest, CommandGroup, CommandInfo, ExecutionOutcome, PathRequest,
    RemoveRequest, ShowRequest, WorkspaceSetRequest,
};
use serde_json::json;

use crate::cli::{CommandGroupCli, PathCommand, WorkspaceCommand};

pub fn command_info(group: &CommandGroupCli) -> CommandInfo {
    match group {
        CommandGroupCli::Apply(_) => CommandInfo::new(CommandGroup::Apply, "apply"),
        CommandGroupCli::Remove(_) => CommandInfo::new(CommandGroup::Remove, "remove"),
        CommandGroupCli::List => CommandInfo::new(CommandGroup::List, "list"),
        CommandGroupCli::Show(_) => CommandInfo::new(CommandGroup::Show, "show"),
        CommandGroupCli::Restore => CommandInfo::new(CommandGroup::Restore, "restore"),
        CommandGroupCli::Workspace(WorkspaceCommand::Show) => {
            CommandInfo::new(CommandGroup::Workspace, "show")
        }
        CommandGroupCli::Workspace(WorkspaceCommand::Set(_)) => {
            CommandInfo::new(CommandGroup::Workspace, "set")
        }
        CommandGroupCli::Path(PathCommand::Normalize(_)) => {
            CommandInfo::new(CommandGroup::Path, "normalize")
        }
        CommandGroupCli::Path(PathCommand::Denormalize(_)) => {
            CommandInfo::new(CommandGroup::Path, "denormalize")
        }
    }
}

pub fn dispatch_command(
    ctx: &mut AppContext,
    group: &CommandGroupCli,
) -> Result<(CommandInfo, ExecutionOutcome)> {
    let info = command_info(group);
    let outcome = match group {
        CommandGroupCli::Apply(args) => {
            let request = ApplyRequest {
                folder: args.folder.clone(),
                icon: args.icon.clone(),
                name: args.name.clone(),
                built_in: args.built_in,
            };
            core_call(|| foldicon_core::apply_icon(ctx, &request))
        }
        CommandGroupCli::Remove(args) => {
            let request = RemoveRequest {
                folder: args.folder.clone(),
                keep_icon: args.keep_icon,
            };
            core_call(|| foldicon_core::remove_icon(ctx, &request))
        }
        CommandGroupCli::List => core_call(|| foldicon_core::list_icons(ctx)),
        CommandGroupCli::Show(args) => {
            let request = ShowRequest {
                folder: args.folder.clone(),
            };
            core_call(|| foldicon_core::show_icon(ctx, &request))
        }
        CommandGroupCli::Restore => core_call(|| foldicon_core::restore_icons(ctx)),
        CommandGroupCli::Workspace(WorkspaceCommand::Show) => {
            core_call(|| foldicon_core::workspace_show(ctx))
        }
        CommandGroupCli::Workspace(WorkspaceCommand::Set(args)) => {
            let request = WorkspaceSetRequest {
                path: args.path.clone(),
            };
            core_call(|| foldicon_core::workspace_set(ctx, &request))
        }
        CommandGroupCli::Path(PathCommand::Normalize(args)) => {
            let request = PathRequest {
                path: args.path.clone(),
            };
            core_call(|| foldicon_core::path_normalize(ctx, &request))
        }
        CommandGroupCli::Path(PathCommand::Denormalize(args)) => {
            let request = PathRequest {
                path: args.path.clone(),
            };
            core_call(|| foldicon_core::path_denormalize(ctx, &request))
        }
    };
    Ok((info, outcome))
}

/// Turns an unexpected handler error into a failed outcome.
pub fn error_outcome(err: &anyhow::Error) -> ExecutionOutcome {
    let issues: Vec<String> = err.chain().map(std::string::ToString::to_string).collect();
    ExecutionOutcome::failure(err.to_string(), json!({ "issues": issues }))
}

fn core_call<F>(action: F) -> ExecutionOutcome
where
    F: FnOnce() -> anyhow::Result<ExecutionOutcome>,
{
    match action() {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            error_outcome(&err)
        }
    }
}
