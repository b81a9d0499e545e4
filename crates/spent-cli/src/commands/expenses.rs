//! Expense command implementations

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use spent_core::aggregate::saturating_sum;
use spent_core::db::Database;
use spent_core::models::{Expense, NewExpense};
use spent_core::{Error, Grouper, RelativeBuckets, Settings};

use super::{money, truncate};

/// Parse and record an entry like `12.50 on lunch`
pub fn cmd_add(db: &Database, owner: &str, text: &[String], cost: Option<Decimal>) -> Result<Expense> {
    let entry = text.join(" ");
    let new = NewExpense::from_entry(owner, &entry, cost);

    let expense = match db.insert_expense(&new) {
        Ok(expense) => expense,
        Err(Error::Validation(errors)) => {
            anyhow::bail!(
                "Could not record \"{}\": {}\nTry e.g. `spent add 12.50 on lunch` or pass --cost",
                entry,
                errors
            )
        }
        Err(e) => return Err(e).context("Failed to record expense"),
    };

    println!("✅ Recorded {} for {}", money(expense.cost), expense.item);
    Ok(expense)
}

pub fn cmd_list(db: &Database, owner: &str, limit: usize, json: bool) -> Result<()> {
    let expenses = db.list_expenses(owner, Some(limit))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&expenses)?);
        return Ok(());
    }

    if expenses.is_empty() {
        println!("No expenses yet. Record one with:");
        println!("  spent add 12.50 on lunch");
        return Ok(());
    }

    println!();
    println!("📝 Recent Expenses");
    println!("   ─────────────────────────────────────────────────────────────");
    for expense in &expenses {
        print_expense(expense);
    }

    Ok(())
}

pub fn cmd_recent(
    db: &Database,
    owner: &str,
    settings: &Settings,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let grouper = Grouper::new(settings.calendar);
    let buckets = grouper.recent(db, owner, Some(settings.recent_limit), now)?;
    print_buckets(&buckets, json, "No expenses yet.")
}

pub fn cmd_search(
    db: &Database,
    owner: &str,
    query: &str,
    settings: &Settings,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let grouper = Grouper::new(settings.calendar);
    let buckets = grouper.search(db, owner, query, now)?;
    print_buckets(&buckets, json, &format!("No expenses matching \"{}\".", query))
}

fn print_buckets(buckets: &RelativeBuckets, json: bool, empty_message: &str) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(buckets)?);
        return Ok(());
    }

    if buckets.is_empty() {
        println!("{}", empty_message);
        return Ok(());
    }

    for (label, expenses) in buckets.iter() {
        let total = saturating_sum(expenses.iter().map(|e| e.cost));
        println!();
        println!("📅 {} ({})", label, money(total));
        println!("   ─────────────────────────────────────────────────────────────");
        for expense in expenses {
            print_expense(expense);
        }
    }

    Ok(())
}

fn print_expense(expense: &Expense) {
    println!(
        "   {} │ {:>10} │ {}",
        expense.created_at.format("%Y-%m-%d %H:%M"),
        money(expense.cost),
        truncate(&expense.item, 40)
    );
}
