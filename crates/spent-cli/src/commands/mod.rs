//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init and shared utilities (open_db, load_settings, resolve_owner)
//! - `expenses` - Expense commands (add, list, recent, search)
//! - `reports` - Spending stats
//! - `export` - CSV export

pub mod core;
pub mod expenses;
pub mod export;
pub mod reports;

// Re-export command functions for main.rs
pub use core::*;
pub use expenses::*;
pub use export::*;
pub use reports::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format a cost for terminal output
pub fn money(cost: rust_decimal::Decimal) -> String {
    format!("${:.2}", cost)
}
