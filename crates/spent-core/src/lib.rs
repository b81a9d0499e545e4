//! Spent Core Library
//!
//! Shared functionality for the Spent expense tracker:
//! - Free-text entry parsing ("12.50 on lunch")
//! - Per-day, per-week and per-month aggregation and averages
//! - Relative-date grouping for list views ("Today", "Last Week", ...)
//! - Expense repository abstraction with SQLite and in-memory backends
//! - Settings, CSV export

pub mod aggregate;
pub mod calendar;
pub mod db;
pub mod error;
pub mod export;
pub mod group;
pub mod models;
pub mod parser;
pub mod repository;
pub mod settings;

/// Fixtures shared by unit, integration and CLI tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use aggregate::{spending_summary, Aggregator};
pub use calendar::{Calendar, Clock, FixedClock, SystemClock};
pub use db::Database;
pub use error::{Error, Result};
pub use export::export_expenses_csv;
pub use group::{bucket_key, BucketKey, Buckets, Grouper, RelativeBuckets, RelativeDate};
pub use models::{Expense, NewExpense, SpendingSummary, TimeUnit, UnitSummary};
pub use parser::{extract, Extracted};
pub use repository::{ExpenseRepository, MemoryRepository};
pub use settings::Settings;
