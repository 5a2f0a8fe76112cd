mod check;
mod filters;
mod text;

use anyhow::Result;
use clap::Subcommand;

use crate::args::Args;
use crate::exit::Exit;

pub trait Command {
    fn execute(&self, args: &Args) -> Result<Exit>;
}

#[derive(Debug, Subcommand)]
pub enum TplcCommand {
    /// Validate the expressions in a serialized template tree
    Check(self::check::Check),
    /// Rewrite a filter pipeline into nested filter calls
    Filters(self::filters::Filters),
    /// Tokenize text around its interpolations
    Text(self::text::Text),
}

impl Command for TplcCommand {
    fn execute(&self, args: &Args) -> Result<Exit> {
        match self {
            TplcCommand::Check(cmd) => cmd.execute(args),
            TplcCommand::Filters(cmd) => cmd.execute(args),
            TplcCommand::Text(cmd) => cmd.execute(args),
        }
    }
}
