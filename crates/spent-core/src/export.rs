//! CSV export of expenses
//!
//! Columns: `id,owner_id,cost,item,created_at`. Costs keep their stored
//! scale and timestamps use the same UTC RFC 3339 form as the database.

use std::io::Write;

use serde::Serialize;
use tracing::debug;

use crate::db::format_datetime;
use crate::error::Result;
use crate::models::Expense;

#[derive(Debug, Serialize)]
struct ExpenseRow<'a> {
    id: i64,
    owner_id: &'a str,
    cost: String,
    item: &'a str,
    created_at: String,
}

impl<'a> From<&'a Expense> for ExpenseRow<'a> {
    fn from(e: &'a Expense) -> Self {
        Self {
            id: e.id,
            owner_id: &e.owner_id,
            cost: e.cost.to_string(),
            item: &e.item,
            created_at: format_datetime(e.created_at),
        }
    }
}

/// Write expenses as CSV, returning the number of rows written
pub fn export_expenses_csv<W: Write>(writer: W, expenses: &[Expense]) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);

    if expenses.is_empty() {
        // serialize() only emits the header alongside the first record
        wtr.write_record(["id", "owner_id", "cost", "item", "created_at"])?;
    }
    for expense in expenses {
        wtr.serialize(ExpenseRow::from(expense))?;
    }
    wtr.flush()?;

    debug!(rows = expenses.len(), "Exported expenses to CSV");
    Ok(expenses.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{expense, ts};

    fn export(expenses: &[Expense]) -> String {
        let mut buf = Vec::new();
        export_expenses_csv(&mut buf, expenses).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_export_quotes_items_with_commas() {
        let expenses = vec![
            expense(2, "12.50", "lunch, with tip", ts("2024-06-15 12:30:00")),
            expense(1, "3", "coffee", ts("2024-06-14 08:00:00")),
        ];

        let csv = export(&expenses);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "id,owner_id,cost,item,created_at");
        assert_eq!(
            lines[1],
            "2,alice,12.50,\"lunch, with tip\",2024-06-15T12:30:00.000000Z"
        );
        assert_eq!(lines[2], "1,alice,3,coffee,2024-06-14T08:00:00.000000Z");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_export_empty_writes_header_only() {
        let mut buf = Vec::new();
        let rows = export_expenses_csv(&mut buf, &[]).unwrap();
        assert_eq!(rows, 0);
        assert_eq!(String::from_utf8(buf).unwrap(), "id,owner_id,cost,item,created_at\n");
    }
}
