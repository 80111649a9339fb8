//! `floorplan` command-line entry point.

use anyhow::Result;
use clap::Parser;

mod args;
mod cmd;

fn main() -> Result<()> {
    env_logger::init();
    let cli = args::Cli::parse();
    cmd::dispatch(cli)
}
