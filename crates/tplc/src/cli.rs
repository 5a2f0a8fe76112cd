use anyhow::Result;
use clap::Parser;

use crate::args::Args;
use crate::commands::Command;
use crate::commands::TplcCommand;
use crate::exit::Exit;

/// Template expression compiler tools.
#[derive(Parser)]
#[command(name = "tplc")]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: TplcCommand,

    #[command(flatten)]
    pub args: Args,
}

/// Parse CLI arguments and execute the chosen command
pub fn run(args: Vec<String>) -> Result<Exit> {
    let cli = Cli::try_parse_from(args).unwrap_or_else(|e| {
        e.exit();
    });

    crate::logging::init_tracing(&cli.args.global);

    cli.command.execute(&cli.args)
}
