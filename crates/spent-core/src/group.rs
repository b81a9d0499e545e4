//! Grouping expenses into buckets for display and aggregation
//!
//! Two kinds of keys are used:
//! - [`BucketKey`] - one calendar day, ISO week or month, for per-period averages
//! - [`RelativeDate`] - human labels such as "Yesterday" or "Last Month"
//!
//! Both are built with [`Buckets::group_by`], which keeps keys in the order
//! they are first seen so output is deterministic.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::calendar::Calendar;
use crate::error::Result;
use crate::models::{Expense, TimeUnit};
use crate::repository::ExpenseRepository;

/// Ordered mapping from key to the values that share it
#[derive(Debug, Clone)]
pub struct Buckets<K, V> {
    index: HashMap<K, usize>,
    entries: Vec<(K, Vec<V>)>,
}

impl<K: Eq + Hash + Clone, V> Buckets<K, V> {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Group `items` by `key_fn`, preserving item order within each bucket
    /// and first-seen order across buckets
    pub fn group_by<I, F>(items: I, key_fn: F) -> Self
    where
        I: IntoIterator<Item = V>,
        F: Fn(&V) -> K,
    {
        let mut buckets = Self::new();
        for item in items {
            let key = key_fn(&item);
            buckets.push(key, item);
        }
        buckets
    }

    pub fn push(&mut self, key: K, value: V) {
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1.push(value),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, vec![value]));
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<&[V]> {
        self.index
            .get(key)
            .map(|&pos| self.entries[pos].1.as_slice())
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[V])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reorder buckets by a key-derived rank (stable for equal ranks)
    pub fn sort_by_key<R: Ord, F: Fn(&K) -> R>(&mut self, rank: F) {
        self.entries.sort_by_key(|(k, _)| rank(k));
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(pos, (k, _))| (k.clone(), pos))
            .collect();
    }

    pub fn into_vec(self) -> Vec<(K, Vec<V>)> {
        self.entries
    }
}

impl<K: Eq + Hash + Clone, V> Default for Buckets<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Serialize, V: Serialize> Serialize for Buckets<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// ========== Period Bucket Keys ==========

/// Identifies one day, week or month
///
/// `period` is the day-of-year, ISO week number or month number. The year is
/// always the calendar year of the date, so ISO week 1 dated late December
/// keeps December's year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BucketKey {
    pub period: u32,
    pub year: i32,
}

pub fn bucket_key(unit: TimeUnit, date: NaiveDate) -> BucketKey {
    let period = match unit {
        TimeUnit::Day => date.ordinal(),
        TimeUnit::Week => date.iso_week().week(),
        TimeUnit::Month => date.month(),
    };
    BucketKey {
        period,
        year: date.year(),
    }
}

// ========== Relative Date Labels ==========

/// Human-relative age of an expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelativeDate {
    Today,
    Yesterday,
    LastWeek,
    TwoWeeksAgo,
    ThreeWeeksAgo,
    FourWeeksAgo,
    LastMonth,
    TwoMonthsAgo,
    ThreeMonthsAgo,
    FourMonthsAgo,
    ThisYear,
    LastYear,
    TwoYearsAgo,
    SeveralYearsAgo,
}

impl RelativeDate {
    /// Display order, most recent first
    pub const ALL: [RelativeDate; 14] = [
        Self::Today,
        Self::Yesterday,
        Self::LastWeek,
        Self::TwoWeeksAgo,
        Self::ThreeWeeksAgo,
        Self::FourWeeksAgo,
        Self::LastMonth,
        Self::TwoMonthsAgo,
        Self::ThreeMonthsAgo,
        Self::FourMonthsAgo,
        Self::ThisYear,
        Self::LastYear,
        Self::TwoYearsAgo,
        Self::SeveralYearsAgo,
    ];

    /// Classify a whole-day distance from today; future dates count as "Several Years Ago"
    pub fn from_days(days: i64) -> Self {
        match days {
            0 => Self::Today,
            1 => Self::Yesterday,
            2..=6 => Self::LastWeek,
            7..=13 => Self::TwoWeeksAgo,
            14..=20 => Self::ThreeWeeksAgo,
            21..=29 => Self::FourWeeksAgo,
            30..=59 => Self::LastMonth,
            60..=89 => Self::TwoMonthsAgo,
            90..=119 => Self::ThreeMonthsAgo,
            120..=139 => Self::FourMonthsAgo,
            140..=364 => Self::ThisYear,
            365..=729 => Self::LastYear,
            730..=1094 => Self::TwoYearsAgo,
            _ => Self::SeveralYearsAgo,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Yesterday => "Yesterday",
            Self::LastWeek => "Last Week",
            Self::TwoWeeksAgo => "Two Weeks Ago",
            Self::ThreeWeeksAgo => "Three Weeks Ago",
            Self::FourWeeksAgo => "Four Weeks Ago",
            Self::LastMonth => "Last Month",
            Self::TwoMonthsAgo => "Two Months Ago",
            Self::ThreeMonthsAgo => "Three Months Ago",
            Self::FourMonthsAgo => "Four Months Ago",
            Self::ThisYear => "This Year",
            Self::LastYear => "Last Year",
            Self::TwoYearsAgo => "Two Years Ago",
            Self::SeveralYearsAgo => "Several Years Ago",
        }
    }
}

impl std::fmt::Display for RelativeDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for RelativeDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Expenses grouped under relative-date labels
pub type RelativeBuckets = Buckets<RelativeDate, Expense>;

/// Groups expenses by how long ago they were created
#[derive(Debug, Clone, Copy, Default)]
pub struct Grouper {
    calendar: Calendar,
}

impl Grouper {
    pub fn new(calendar: Calendar) -> Self {
        Self { calendar }
    }

    /// Relative-date label of `created_at` as seen from `now`
    pub fn relative_date(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> RelativeDate {
        let today = self.calendar.local_date(now);
        let days = (today - self.calendar.local_date(created_at)).num_days();
        RelativeDate::from_days(days)
    }

    pub fn group_by_relative_date(&self, expenses: &[Expense], now: DateTime<Utc>) -> RelativeBuckets {
        let buckets = Buckets::group_by(expenses.iter().cloned(), |e| {
            self.relative_date(e.created_at, now)
        });
        tracing::debug!(
            expenses = expenses.len(),
            buckets = buckets.len(),
            "Grouped expenses by relative date"
        );
        buckets
    }

    /// Keep expenses whose item contains `query` (case-sensitive), then group them
    pub fn search_grouped_by_relative_date(
        &self,
        query: &str,
        expenses: &[Expense],
        now: DateTime<Utc>,
    ) -> RelativeBuckets {
        let matching: Vec<Expense> = expenses
            .iter()
            .filter(|e| e.item.contains(query))
            .cloned()
            .collect();
        self.group_by_relative_date(&matching, now)
    }

    /// Load an owner's expenses (optionally only the newest `limit`) and group them
    pub fn recent<R: ExpenseRepository + ?Sized>(
        &self,
        repo: &R,
        owner_id: &str,
        limit: Option<usize>,
        now: DateTime<Utc>,
    ) -> Result<RelativeBuckets> {
        let expenses = repo.expenses_for(owner_id, limit)?;
        Ok(self.group_by_relative_date(&expenses, now))
    }

    /// Search an owner's expenses through the repository and group the matches
    pub fn search<R: ExpenseRepository + ?Sized>(
        &self,
        repo: &R,
        owner_id: &str,
        query: &str,
        now: DateTime<Utc>,
    ) -> Result<RelativeBuckets> {
        let expenses = repo.expenses_matching(owner_id, query)?;
        Ok(self.search_grouped_by_relative_date(query, &expenses, now))
    }
}
