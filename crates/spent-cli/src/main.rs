//! Spent CLI - Quick-entry expense tracker
//!
//! Usage:
//!   spent init                  Initialize database
//!   spent add 12.50 on lunch    Record an expense
//!   spent recent                Recent expenses by relative date
//!   spent stats --unit week     Totals and averages

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use spent_core::{Clock, SystemClock};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    if let Commands::Init = cli.command {
        return commands::cmd_init(&cli.db, cli.no_encrypt);
    }

    let settings = commands::load_settings(cli.config.as_deref())?;
    let owner = commands::resolve_owner(cli.owner.as_deref(), &settings)?;
    let db = commands::open_db(&cli.db, cli.no_encrypt)?;
    let now = SystemClock.now();

    match cli.command {
        Commands::Init => Ok(()),
        Commands::Add { text, cost } => commands::cmd_add(&db, &owner, &text, cost).map(|_| ()),
        Commands::List { limit, json } => {
            commands::cmd_list(&db, &owner, limit.unwrap_or(settings.recent_limit), json)
        }
        Commands::Recent { json } => commands::cmd_recent(&db, &owner, &settings, now, json),
        Commands::Search { query, json } => {
            commands::cmd_search(&db, &owner, &query, &settings, now, json)
        }
        Commands::Stats { unit, json } => {
            commands::cmd_stats(&db, &owner, unit, &settings, now, json)
        }
        Commands::Export { output } => commands::cmd_export(&db, &owner, output.as_deref()),
    }
}
