use clap::Parser;
use color_eyre::Result;
use foldicon_core::{AppContext, GlobalOptions};

mod cli;
mod dispatch;
mod output;
mod style;

use cli::FoldiconCli;
use output::{emit_output, OutputOptions};

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = FoldiconCli::parse();
    init_tracing(cli.trace, cli.verbose, cli.quiet);

    let global = GlobalOptions {
        workspace: cli.workspace.clone(),
    };

    let (info, outcome) = match AppContext::from_env(&global) {
        Ok(mut ctx) => dispatch::dispatch_command(&mut ctx, &cli.command)?,
        Err(err) => (
            dispatch::command_info(&cli.command),
            dispatch::error_outcome(&err),
        ),
    };

    let opts = OutputOptions {
        quiet: cli.quiet,
        json: cli.json,
        no_color: cli.no_color,
    };
    let code = emit_output(&opts, info, &outcome)?;

    if code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

fn init_tracing(trace: bool, verbose: u8, quiet: bool) {
    let level = if trace {
        "trace"
    } else if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = format!(
        "foldicon={level},foldicon_cli={level},foldicon_core={level},foldicon_domain={level}"
    );
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
