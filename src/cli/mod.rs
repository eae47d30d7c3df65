//! # CLI Module
//!
//! Command-line parsing for `copyright`. There are no subcommands: every flag
//! lives on [`CheckArgs`].

mod check;

pub use check::{CheckArgs, run_check};
use clap::Parser;
use clap::builder::styling::{AnsiColor, Styles};

const STYLES: Styles = Styles::styled()
  .header(AnsiColor::Green.on_default().bold())
  .literal(AnsiColor::Blue.on_default().bold())
  .placeholder(AnsiColor::Cyan.on_default());

const EXAMPLES: &str = "Examples:
  # Check, print a summary and only look at Java-like sources
  copyright -c -j src/

  # Repair files in place, joining years with a dash
  copyright -r -D src/ docs/

  # Stage repairs in <file>.new and show what would change
  copyright -r -n --show-diff .

  # Use a project template, skip generated code and untracked files
  copyright -C etc/copyright.txt -X /generated/ -X \"*.min.js\" -s .

  # Write a JSON report of every file checked
  copyright --report-json copyright.json .
";

#[derive(Parser, Debug)]
#[command(
  name = "copyright",
  version,
  long_version = concat!(env!("CARGO_PKG_VERSION"), " (commit ", env!("COPYRIGHT_CHECK_COMMIT"), ")"),
  about,
  styles = STYLES,
  after_help = EXAMPLES
)]
pub struct Cli {
  #[command(flatten)]
  pub check_args: CheckArgs,
}

impl Cli {
  pub fn into_check_args(self) -> CheckArgs {
    self.check_args
  }
}
