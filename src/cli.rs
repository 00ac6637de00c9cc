use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "storyreel",
    version,
    about = "Browse and play author stories in the terminal"
)]
pub struct Cli {
    /// Stories document to load: a local path or an http(s) URL.
    #[arg(long, global = true, value_name = "PATH|URL")]
    pub catalog: Option<String>,

    /// Log file (defaults to the user data directory).
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Tui,
    /// Open the viewer directly on the author at INDEX (0-based).
    View { index: usize },
    List,
}
