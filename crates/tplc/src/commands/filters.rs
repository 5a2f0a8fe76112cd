use anyhow::Result;
use clap::Parser;
use tplc_templates::FilterExpression;

use crate::args::Args;
use crate::commands::Command;
use crate::exit::Exit;

#[derive(Debug, Parser)]
pub struct Filters {
    /// Binding expression, e.g. `message | capitalize | truncate(10)`.
    expression: String,

    /// Print the parsed base expression and filter chain as JSON instead.
    #[arg(long)]
    json: bool,
}

impl Command for Filters {
    fn execute(&self, _args: &Args) -> Result<Exit> {
        let parsed = FilterExpression::parse(&self.expression);
        if self.json {
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        } else {
            println!("{}", parsed.to_source());
        }
        Ok(Exit::success())
    }
}
