mod app;
mod catalog;
mod cli;
mod engine;
mod http;
mod logging;
mod paths;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    logging::init_or_warn(cli.log_file.as_deref());
    app::run(cli)
}
