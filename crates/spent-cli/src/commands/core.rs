//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_settings` / `resolve_owner` - Per-invocation context
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use spent_core::{db::Database, Settings};

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", db_path.display()))?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

pub fn load_settings(config: Option<&Path>) -> Result<Settings> {
    let settings = Settings::load(config).context("Failed to load settings")?;
    if let Some(source) = &settings.source {
        tracing::debug!(path = %source.display(), "Using settings file");
    }
    Ok(settings)
}

/// The owner from --owner / SPENT_OWNER, else the configured default
pub fn resolve_owner(cli_owner: Option<&str>, settings: &Settings) -> Result<String> {
    cli_owner
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .or_else(|| settings.default_owner.clone())
        .context("No owner given. Pass --owner, set SPENT_OWNER, or set [owner] default in settings.toml")
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt)?;

    if !db.is_encrypted() {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Record an expense: spent --owner me add 12.50 on lunch");
    println!("  2. See how you're doing: spent --owner me stats");

    Ok(())
}
