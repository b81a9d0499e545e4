//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use spent_core::TimeUnit;

/// Spent - Track what you spend, one line at a time
#[derive(Parser)]
#[command(name = "spent")]
#[command(about = "Quick-entry expense tracker with daily, weekly and monthly averages", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "spent.db", env = "SPENT_DB", global = true)]
    pub db: PathBuf,

    /// Whose expenses to record and report (falls back to settings)
    #[arg(long, env = "SPENT_OWNER", global = true)]
    pub owner: Option<String>,

    /// Settings file (defaults to ~/.config/spent/settings.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set SPENT_DB_KEY environment variable with your passphrase.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Record an expense, e.g. `spent add 12.50 on lunch`
    Add {
        /// Entry text: an optional cost, optional "on"/"for", then the item
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Cost to use instead of parsing it from the text
        #[arg(short, long)]
        cost: Option<Decimal>,
    },

    /// List expenses, newest first
    List {
        /// Maximum number to show (defaults to the display.recent_limit setting)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recent expenses grouped by how long ago they happened
    Recent {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Find expenses whose item contains the query (case-sensitive)
    Search {
        query: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show totals and averages per day, week and month
    Stats {
        /// Only this unit: day, week, month
        #[arg(short, long)]
        unit: Option<TimeUnit>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export expenses to CSV
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
