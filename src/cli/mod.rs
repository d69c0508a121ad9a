//! Command line interface for the release pipeline.

mod args;
mod commands;

pub use args::{Args, Command, RunArgs, StampArgs};

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();

    match args.command {
        Command::Run(run_args) => commands::run_pipeline(run_args).await,
        Command::Stamp(stamp_args) => commands::stamp(stamp_args).await,
    }
}
