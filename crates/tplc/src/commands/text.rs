use anyhow::Result;
use clap::Parser;
use tplc_templates::parse_text;
use tplc_templates::Delimiters;

use crate::args::Args;
use crate::commands::Command;
use crate::exit::Exit;

#[derive(Debug, Parser)]
pub struct Text {
    /// Text that may contain interpolations.
    text: String,

    /// Custom delimiter pair, e.g. `[[,]]`.
    #[arg(long, value_delimiter = ',', value_name = "OPEN,CLOSE")]
    delimiters: Vec<String>,
}

impl Command for Text {
    fn execute(&self, _args: &Args) -> Result<Exit> {
        let delimiters = match self.delimiters.as_slice() {
            [open, close] if !open.is_empty() && !close.is_empty() => {
                Some(Delimiters::new(open.as_str(), close.as_str()))
            }
            [] => None,
            _ => anyhow::bail!("--delimiters needs a non-empty opening and closing delimiter"),
        };

        match parse_text(&self.text, delimiters.as_ref()) {
            Some(parsed) => {
                println!("{}", serde_json::to_string_pretty(&parsed)?);
                Ok(Exit::success())
            }
            None => Ok(Exit::error().with_message("No interpolation found.")),
        }
    }
}
