//! CLI subcommand definitions.

pub mod page;

use clap::{Args, Subcommand};
use logkit::level::Level;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the entries of a log file page by page
    Page(PageArgs),

    /// Tee stdin into a batched log file
    Capture(CaptureArgs),
}

/// Arguments for the page subcommand.
#[derive(Args, Debug)]
pub struct PageArgs {
    /// Log file to index
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Only entries with exactly this tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Minimum severity (V, D, I, W, E, A or a level name)
    #[arg(short = 'l', long)]
    pub level: Option<Level>,

    /// Entries requested per page
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Keep printing entries as the file grows
    #[arg(short = 'f', long)]
    pub follow: bool,
}

/// Arguments for the capture subcommand.
#[derive(Args, Debug)]
pub struct CaptureArgs {
    /// Tag stamped on every captured line
    #[arg(long)]
    pub tag: String,

    /// Severity stamped on every captured line
    #[arg(short = 'l', long, default_value = "info")]
    pub level: Level,

    /// Output directory (overrides the config file)
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Output file name inside the directory
    #[arg(long)]
    pub file_name: Option<String>,
}
