//! Export command implementation

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use spent_core::db::Database;
use spent_core::export_expenses_csv;

pub fn cmd_export(db: &Database, owner: &str, output: Option<&Path>) -> Result<()> {
    let expenses = db.list_expenses(owner, None)?;

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            let rows = export_expenses_csv(BufWriter::new(file), &expenses)
                .context("Failed to write CSV")?;
            println!("✅ Exported {} expenses to {}", rows, path.display());
        }
        None => {
            export_expenses_csv(std::io::stdout().lock(), &expenses)
                .context("Failed to write CSV")?;
        }
    }

    Ok(())
}
