//! # copyright
//!
//! Checks that source files carry the project's copyright header with an
//! up-to-date year, and repairs the ones that don't.

mod cli;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, run_check};

#[tokio::main]
async fn main() -> Result<()> {
  let status = run_check(Cli::parse().into_check_args()).await?;
  std::process::exit(status)
}
