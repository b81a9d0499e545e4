//! Domain models for Spent

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Largest cost a single expense may carry
pub const MAX_COST: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// A recorded expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    /// The user who created this expense
    pub owner_id: String,
    pub cost: Decimal,
    pub item: String,
    pub created_at: DateTime<Utc>,
}

/// Expense to be inserted (before validation and id assignment)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    pub owner_id: String,
    /// Unset when the entry text carried no recognizable cost
    pub cost: Option<Decimal>,
    pub item: String,
    /// Defaults to the repository clock's "now" when unset
    pub created_at: Option<DateTime<Utc>>,
}

impl NewExpense {
    pub fn new(owner_id: impl Into<String>, cost: Option<Decimal>, item: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            cost,
            item: item.into(),
            created_at: None,
        }
    }

    /// Build from raw entry text, pulling the cost out of the text unless one is given
    pub fn from_entry(
        owner_id: impl Into<String>,
        raw_item: &str,
        existing_cost: Option<Decimal>,
    ) -> Self {
        let extracted = crate::parser::extract(raw_item, existing_cost);
        Self::new(owner_id, extracted.cost, extracted.item)
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Check the persistence invariants: owner present, 0 < cost <= [`MAX_COST`], item non-empty
    pub fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        if self.owner_id.trim().is_empty() {
            errors.push(ValidationError::new(ExpenseField::OwnerId, ValidationKind::Missing));
        }

        match self.cost {
            None => errors.push(ValidationError::new(ExpenseField::Cost, ValidationKind::Missing)),
            Some(cost) if cost <= Decimal::ZERO => {
                errors.push(ValidationError::new(ExpenseField::Cost, ValidationKind::NotPositive))
            }
            Some(cost) if cost > MAX_COST => {
                errors.push(ValidationError::new(ExpenseField::Cost, ValidationKind::TooLarge))
            }
            Some(_) => {}
        }

        if self.item.trim().is_empty() {
            errors.push(ValidationError::new(ExpenseField::Item, ValidationKind::Empty));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

/// Field of an expense that failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseField {
    OwnerId,
    Cost,
    Item,
}

impl ExpenseField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OwnerId => "owner_id",
            Self::Cost => "cost",
            Self::Item => "item",
        }
    }
}

/// Why a field failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    Missing,
    NotPositive,
    TooLarge,
    Empty,
}

impl ValidationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "is required",
            Self::NotPositive => "must be greater than zero",
            Self::TooLarge => "must not exceed 1000000000",
            Self::Empty => "must not be empty",
        }
    }
}

/// A single field-level validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: ExpenseField,
    pub kind: ValidationKind,
}

impl ValidationError {
    pub fn new(field: ExpenseField, kind: ValidationKind) -> Self {
        Self { field, kind }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field.as_str(), self.kind.as_str())
    }
}

/// All validation failures for one expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    /// Whether `field` failed for the given reason
    pub fn has(&self, field: ExpenseField, kind: ValidationKind) -> bool {
        self.0.iter().any(|e| e.field == field && e.kind == kind)
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", parts.join(", "))
    }
}

// ========== Aggregation Models ==========

/// Aggregation granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Day,
    Week,
    Month,
}

impl TimeUnit {
    pub const ALL: [TimeUnit; 3] = [Self::Day, Self::Week, Self::Month];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// Nominal length in seconds; a month is always 30 days here
    pub fn seconds(&self) -> i64 {
        const DAY: i64 = 86_400;
        match self {
            Self::Day => DAY,
            Self::Week => 7 * DAY,
            Self::Month => 30 * DAY,
        }
    }
}

impl std::str::FromStr for TimeUnit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" | "daily" => Ok(Self::Day),
            "week" | "weekly" => Ok(Self::Week),
            "month" | "monthly" => Ok(Self::Month),
            _ => Err(format!("Unknown unit: {} (valid: day, week, month)", s)),
        }
    }
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Spending figures for one unit, as shown on the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSummary {
    pub unit: TimeUnit,
    /// Spent in the current calendar period
    pub total: Decimal,
    /// Overall average per unit since the first expense
    pub average: Decimal,
    /// Average of the most recent bucket, if any
    pub recent_average: Option<Decimal>,
    pub above_average: bool,
}

/// Dashboard summary across all units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendingSummary {
    pub owner_id: String,
    pub generated_at: DateTime<Utc>,
    pub expense_count: usize,
    pub units: Vec<UnitSummary>,
}
