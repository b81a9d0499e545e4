//! Expense operations

use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::{format_datetime, parse_datetime, Database};
use crate::error::Result;
use crate::models::{Expense, NewExpense};
use crate::repository::ExpenseRepository;

const EXPENSE_COLUMNS: &str = "id, owner_id, cost, item, created_at";

/// Map a row selected with `EXPENSE_COLUMNS`
fn row_to_expense(row: &Row<'_>) -> rusqlite::Result<Expense> {
    let cost: String = row.get(2)?;
    let created_at: String = row.get(4)?;

    Ok(Expense {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        cost: Decimal::from_str(&cost).map_err(|e| {
            warn!(cost = %cost, "Unparseable stored cost");
            rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e))
        })?,
        item: row.get(3)?,
        created_at: parse_datetime(&created_at).map_err(|e| {
            warn!(created_at = %created_at, "Unparseable stored timestamp");
            rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e))
        })?,
    })
}

impl Database {
    /// Validate and insert an expense, returning the stored record
    pub fn insert_expense(&self, new: &NewExpense) -> Result<Expense> {
        new.validate()?;

        let cost = new.cost.unwrap_or_default();
        let created_at = new.created_at.unwrap_or_else(|| self.now());

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO expenses (owner_id, cost, item, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                new.owner_id,
                cost.to_string(),
                new.item,
                format_datetime(created_at),
            ],
        )?;
        let id = conn.last_insert_rowid();

        info!(id, owner = %new.owner_id, %cost, "Recorded expense");

        Ok(Expense {
            id,
            owner_id: new.owner_id.clone(),
            cost,
            item: new.item.clone(),
            created_at,
        })
    }

    /// Get a single expense by id
    pub fn get_expense(&self, id: i64) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        let expense = conn
            .query_row(
                &format!("SELECT {} FROM expenses WHERE id = ?", EXPENSE_COLUMNS),
                params![id],
                row_to_expense,
            )
            .optional()?;
        Ok(expense)
    }

    /// List an owner's expenses, newest first
    pub fn list_expenses(&self, owner_id: &str, limit: Option<usize>) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        // SQLite treats a negative LIMIT as "no limit"
        let limit = limit.map(|l| l as i64).unwrap_or(-1);

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM expenses WHERE owner_id = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2",
            EXPENSE_COLUMNS
        ))?;
        let expenses = stmt
            .query_map(params![owner_id, limit], row_to_expense)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(expenses)
    }

    /// Search an owner's expenses by case-sensitive substring of the item
    pub fn search_expenses(&self, owner_id: &str, query: &str) -> Result<Vec<Expense>> {
        let conn = self.conn()?;

        // instr() is case-sensitive where LIKE is not
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM expenses WHERE owner_id = ?1 AND instr(item, ?2) > 0 ORDER BY created_at DESC, id DESC",
            EXPENSE_COLUMNS
        ))?;
        let expenses = stmt
            .query_map(params![owner_id, query], row_to_expense)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(expenses)
    }

    /// The owner's first expense by creation time
    pub fn earliest_expense(&self, owner_id: &str) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        let expense = conn
            .query_row(
                &format!(
                    "SELECT {} FROM expenses WHERE owner_id = ?1 ORDER BY created_at ASC, id ASC LIMIT 1",
                    EXPENSE_COLUMNS
                ),
                params![owner_id],
                row_to_expense,
            )
            .optional()?;
        Ok(expense)
    }

    /// Count an owner's expenses
    pub fn count_expenses(&self, owner_id: &str) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM expenses WHERE owner_id = ?1",
            params![owner_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

impl ExpenseRepository for Database {
    fn insert(&self, new: &NewExpense) -> Result<Expense> {
        self.insert_expense(new)
    }

    fn expenses_for(&self, owner_id: &str, limit: Option<usize>) -> Result<Vec<Expense>> {
        self.list_expenses(owner_id, limit)
    }

    fn expenses_matching(&self, owner_id: &str, query: &str) -> Result<Vec<Expense>> {
        self.search_expenses(owner_id, query)
    }

    fn earliest(&self, owner_id: &str) -> Result<Option<Expense>> {
        self.earliest_expense(owner_id)
    }
}
