use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

pub const FOLDICON_HELP_TEMPLATE: &str =
    "{before-help}\nUsage:\n    {usage}\n\nGlobal options:\n{options}\n";

pub const FOLDICON_BEFORE_HELP: &str = concat!(
    "foldicon ",
    env!("CARGO_PKG_VERSION"),
    " – custom folder icons that survive moves and reinstalls\n\n",
    "\x1b[1;36mIcons\x1b[0m\n",
    "  apply            Copy an icon into the workspace and set it on a folder.\n",
    "  remove           Clear a folder's icon and forget its record.\n",
    "  list / show      Inspect recorded icons.\n",
    "  restore          Reapply every recorded icon (after a reinstall or on a new machine).\n\n",
    "\x1b[1;36mWorkspace\x1b[0m\n",
    "  workspace        Show or change where icons and records are kept.\n",
    "  path             Show how paths are stored with the {USER} placeholder.\n",
);

#[derive(Parser, Debug)]
#[command(
    name = "foldicon",
    author,
    version,
    propagate_version = false,
    disable_help_subcommand = true,
    before_help = FOLDICON_BEFORE_HELP,
    help_template = FOLDICON_HELP_TEMPLATE
)]
#[allow(clippy::struct_excessive_bools)]
pub struct FoldiconCli {
    #[arg(
        short,
        long,
        help = "Suppress human output (errors still print to stderr)",
        global = true
    )]
    pub quiet: bool,
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        help = "Increase logging (-vvv reaches trace)",
        global = true
    )]
    pub verbose: u8,
    #[arg(long, help = "Force trace logging regardless of -v/-q", global = true)]
    pub trace: bool,
    #[arg(
        long,
        help = "Emit {status,message,details} JSON envelopes",
        global = true
    )]
    pub json: bool,
    #[arg(long, help = "Disable colored human output", global = true)]
    pub no_color: bool,
    #[arg(
        long,
        value_name = "PATH",
        help = "Use this workspace for one invocation (the saved setting is unchanged)",
        global = true
    )]
    pub workspace: Option<PathBuf>,
    #[command(subcommand)]
    pub command: CommandGroupCli,
}

#[derive(Subcommand, Debug)]
pub enum CommandGroupCli {
    #[command(about = "Apply an icon to a folder and record it")]
    Apply(ApplyArgs),
    #[command(about = "Remove a folder's icon and its record")]
    Remove(RemoveArgs),
    #[command(about = "List recorded icons, newest first")]
    List,
    #[command(about = "Show the recorded icon for a folder")]
    Show(FolderArgs),
    #[command(about = "Reapply every recorded icon")]
    Restore,
    #[command(subcommand, about = "Show or change the workspace")]
    Workspace(WorkspaceCommand),
    #[command(subcommand, about = "Convert paths to and from stored form")]
    Path(PathCommand),
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    #[arg(value_name = "FOLDER", help = "Folder to decorate")]
    pub folder: PathBuf,
    #[arg(value_name = "ICON", help = "Icon file, or a data:<mime>;base64,... URL")]
    pub icon: String,
    #[arg(long, help = "Name to record for the icon (defaults to its file name)")]
    pub name: Option<String>,
    #[arg(long, help = "Mark the icon as one of the bundled set")]
    pub built_in: bool,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    #[arg(value_name = "FOLDER")]
    pub folder: PathBuf,
    #[arg(long, help = "Forget the record but leave the folder's icon in place")]
    pub keep_icon: bool,
}

#[derive(Args, Debug)]
pub struct FolderArgs {
    #[arg(value_name = "FOLDER")]
    pub folder: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum WorkspaceCommand {
    #[command(about = "Print the active workspace")]
    Show,
    #[command(about = "Switch to another workspace and save it as the default")]
    Set(WorkspaceSetArgs),
}

#[derive(Args, Debug)]
pub struct WorkspaceSetArgs {
    #[arg(value_name = "PATH")]
    pub path: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum PathCommand {
    #[command(about = "Rewrite the current user's home to {USER}")]
    Normalize(PathArgs),
    #[command(about = "Expand {USER} to the current user")]
    Denormalize(PathArgs),
}

#[derive(Args, Debug)]
pub struct PathArgs {
    #[arg(value_name = "PATH")]
    pub path: String,
}
