//! Report command implementations

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use spent_core::db::Database;
use spent_core::{spending_summary, Settings, TimeUnit};

use super::money;

pub fn cmd_stats(
    db: &Database,
    owner: &str,
    unit: Option<TimeUnit>,
    settings: &Settings,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let mut summary = spending_summary(db, owner, settings.calendar, now)
        .context("Failed to compute spending summary")?;
    if let Some(unit) = unit {
        summary.units.retain(|u| u.unit == unit);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if summary.expense_count == 0 {
        println!("No expenses yet. Record one with:");
        println!("  spent add 12.50 on lunch");
        return Ok(());
    }

    println!();
    println!("📊 Spending for {} ({} expenses)", summary.owner_id, summary.expense_count);
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:<6} │ {:>12} │ {:>12} │ {:>12}",
        "Unit", "This period", "Average", "Latest avg"
    );

    for u in &summary.units {
        let latest = u.recent_average.map(money).unwrap_or_else(|| "-".to_string());
        let marker = if u.above_average { " ⬆️" } else { "" };
        println!(
            "   {:<6} │ {:>12} │ {:>12} │ {:>12}{}",
            u.unit.as_str(),
            money(u.total),
            money(u.average),
            latest,
            marker
        );
    }

    Ok(())
}
