//! Free-text expense entry parsing
//!
//! Turns entries like `"12.50 on lunch"` or `"3 for coffee"` into a cost and
//! an item description. Entries without a leading cost are left untouched so
//! that validation can report the missing cost.

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Optional ASCII cost, optional "on"/"for", whitespace, then text starting with a non-space
///
/// `(?s)` lets the item run across line breaks.
const ENTRY_PATTERN: &str = r"(?s)^([0-9]+(?:\.[0-9]{1,2})?)?(?:\s+(?:on|for))?\s+(\S.*)$";

fn entry_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ENTRY_PATTERN).expect("valid regex"))
}

/// Result of parsing an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extracted {
    pub cost: Option<Decimal>,
    pub item: String,
}

/// Extract a cost and item from `raw_item`
///
/// An `existing_cost` short-circuits parsing: it is returned together with
/// `raw_item` exactly as given.
pub fn extract(raw_item: &str, existing_cost: Option<Decimal>) -> Extracted {
    if existing_cost.is_some() {
        return Extracted {
            cost: existing_cost,
            item: raw_item.to_string(),
        };
    }

    let Some(caps) = entry_regex().captures(raw_item) else {
        return Extracted {
            cost: None,
            item: raw_item.to_string(),
        };
    };

    let cost = match caps.get(1) {
        Some(m) => match Decimal::from_str(m.as_str()) {
            Ok(cost) => Some(cost),
            // Too many digits for a Decimal: treat the entry as unparsed
            Err(e) => {
                tracing::debug!(token = m.as_str(), error = %e, "Cost token out of range");
                return Extracted {
                    cost: None,
                    item: raw_item.to_string(),
                };
            }
        },
        None => None,
    };
    let item = caps
        .get(2)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    tracing::debug!(?cost, item = %item, "Parsed expense entry");

    Extracted { cost, item }
}
