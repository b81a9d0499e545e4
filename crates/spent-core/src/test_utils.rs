//! Test utilities for spent-core
//!
//! Fixtures shared by unit tests, integration tests and the CLI tests.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use rust_decimal::Decimal;

use crate::models::Expense;

/// Owner used by fixtures unless a test needs several
pub const TEST_OWNER: &str = "alice";

/// Parse a decimal literal
pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// Parse a `YYYY-MM-DD HH:MM:SS` UTC timestamp
pub fn ts(s: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .unwrap()
        .and_utc()
}

/// Build a persisted-looking expense for `TEST_OWNER`
pub fn expense(id: i64, cost: &str, item: &str, created_at: DateTime<Utc>) -> Expense {
    Expense {
        id,
        owner_id: TEST_OWNER.to_string(),
        cost: dec(cost),
        item: item.to_string(),
        created_at,
    }
}

/// Expenses created `days_ago` whole days before `now`, newest first
///
/// Each entry is `(days_ago, cost, item)`; ids are assigned by position.
pub fn expenses_days_ago(now: DateTime<Utc>, entries: &[(i64, &str, &str)]) -> Vec<Expense> {
    let mut expenses: Vec<Expense> = entries
        .iter()
        .enumerate()
        .map(|(i, (days, cost, item))| {
            expense(i as i64 + 1, cost, item, now - Duration::days(*days))
        })
        .collect();
    expenses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    expenses
}
