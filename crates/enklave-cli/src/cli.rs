//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Time spent at Enklave.
///
/// Reads check-in and check-out notification mails from a folder, pairs them
/// into stays and reports the total time.
#[derive(Debug, Parser)]
#[command(name = "enklave", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Folder containing the notification mails (overrides `mail_dir`).
    #[arg(short, long, global = true)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the total time spent at Enklave (default).
    Total,

    /// Show every stay, every discarded event and the total.
    Report {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the parsed events as JSON lines, oldest first.
    Events,
}
