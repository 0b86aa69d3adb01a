//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Meeting notes browser.
///
/// Fetches notes from every configured source at once and lists them grouped
/// by day, most recent first.
#[derive(Debug, Parser)]
#[command(name = "mn", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch notes and show them grouped by day.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,

        /// Toggle the fold state of a day, by label (e.g. "Monday, Feb 28").
        /// May be repeated; toggling the same day twice restores it.
        #[arg(long = "toggle", value_name = "DAY")]
        toggles: Vec<String>,

        /// Print progress and the days loaded so far while sources settle.
        #[arg(long)]
        progress: bool,

        /// Use the built-in demo sources instead of the configured ones.
        #[arg(long)]
        demo: bool,
    },

    /// Show configured sources.
    Sources,
}
