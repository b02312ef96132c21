//! Command-line interface

use clap::Parser;
use std::path::PathBuf;

/// Share a directory over HTTP
#[derive(Parser, Debug, Clone)]
#[command(name = "tfile", version, about)]
pub struct Cli {
    /// Directory to share (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// TOML configuration file (default: ./tfile.toml if present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
