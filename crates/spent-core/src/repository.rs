//! Expense storage abstraction
//!
//! The aggregation and grouping code only ever reads through
//! [`ExpenseRepository`], with the owner passed explicitly on every call.
//! [`crate::db::Database`] is the SQLite implementation; [`MemoryRepository`]
//! keeps everything in a `Vec` for embedding and tests.

use std::cell::RefCell;
use std::sync::Arc;

use tracing::info;

use crate::calendar::{Clock, SystemClock};
use crate::error::Result;
use crate::models::{Expense, NewExpense};

pub trait ExpenseRepository {
    /// Validate and store a new expense
    ///
    /// Fails with [`crate::Error::Validation`] when the expense breaks the
    /// persistence invariants. `created_at` defaults to the repository clock.
    fn insert(&self, new: &NewExpense) -> Result<Expense>;

    /// An owner's expenses, newest first, optionally only the first `limit`
    fn expenses_for(&self, owner_id: &str, limit: Option<usize>) -> Result<Vec<Expense>>;

    /// An owner's expenses whose item contains `query` (case-sensitive), newest first
    fn expenses_matching(&self, owner_id: &str, query: &str) -> Result<Vec<Expense>>;

    /// The owner's first expense by creation time
    fn earliest(&self, owner_id: &str) -> Result<Option<Expense>>;
}

/// In-memory repository
pub struct MemoryRepository {
    expenses: RefCell<Vec<Expense>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            expenses: RefCell::new(Vec::new()),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.expenses.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.borrow().is_empty()
    }

    /// Owner's expenses matching `keep`, newest first (ties broken by newest id)
    fn select<F: Fn(&Expense) -> bool>(&self, owner_id: &str, keep: F) -> Vec<Expense> {
        let mut selected: Vec<Expense> = self
            .expenses
            .borrow()
            .iter()
            .filter(|e| e.owner_id == owner_id && keep(e))
            .cloned()
            .collect();
        selected.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        selected
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpenseRepository for MemoryRepository {
    fn insert(&self, new: &NewExpense) -> Result<Expense> {
        new.validate()?;

        let mut expenses = self.expenses.borrow_mut();
        let expense = Expense {
            id: expenses.len() as i64 + 1,
            owner_id: new.owner_id.clone(),
            cost: new.cost.unwrap_or_default(),
            item: new.item.clone(),
            created_at: new.created_at.unwrap_or_else(|| self.clock.now()),
        };
        expenses.push(expense.clone());

        info!(id = expense.id, owner = %expense.owner_id, "Recorded expense");
        Ok(expense)
    }

    fn expenses_for(&self, owner_id: &str, limit: Option<usize>) -> Result<Vec<Expense>> {
        let mut expenses = self.select(owner_id, |_| true);
        if let Some(limit) = limit {
            expenses.truncate(limit);
        }
        Ok(expenses)
    }

    fn expenses_matching(&self, owner_id: &str, query: &str) -> Result<Vec<Expense>> {
        Ok(self.select(owner_id, |e| e.item.contains(query)))
    }

    fn earliest(&self, owner_id: &str) -> Result<Option<Expense>> {
        Ok(self
            .expenses
            .borrow()
            .iter()
            .filter(|e| e.owner_id == owner_id)
            .min_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
            .cloned())
    }
}
