//! Spending totals and averages
//!
//! An [`Aggregator`] works over one owner's expenses, newest first. Totals use
//! real calendar periods (see [`Calendar::period_bounds`]) while the average
//! divides by a nominal unit length from [`TimeUnit::seconds`], so a "month" of
//! history is always 30 days there.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, warn};

use crate::calendar::Calendar;
use crate::error::Result;
use crate::group::{bucket_key, Buckets};
use crate::models::{Expense, SpendingSummary, TimeUnit, UnitSummary};
use crate::repository::ExpenseRepository;

/// Decimal places kept for per-bucket averages
const AVERAGE_DP: u32 = 2;

/// Sum that stops at `Decimal::MAX` instead of panicking on overflow
pub fn saturating_sum<I: IntoIterator<Item = Decimal>>(values: I) -> Decimal {
    let mut total = Decimal::ZERO;
    for value in values {
        match total.checked_add(value) {
            Some(sum) => total = sum,
            None => {
                warn!(%total, %value, "Decimal sum overflowed, saturating");
                return Decimal::MAX;
            }
        }
    }
    total
}

pub struct Aggregator<'a> {
    expenses: &'a [Expense],
    earliest: Option<DateTime<Utc>>,
    calendar: Calendar,
}

impl<'a> Aggregator<'a> {
    /// Aggregate `expenses` (newest first), taking the earliest timestamp from the slice
    pub fn new(expenses: &'a [Expense], calendar: Calendar) -> Self {
        let earliest = expenses.iter().map(|e| e.created_at).min();
        Self {
            expenses,
            earliest,
            calendar,
        }
    }

    /// Override where history starts (e.g. with the repository's earliest record)
    pub fn with_earliest(mut self, earliest: Option<DateTime<Utc>>) -> Self {
        self.earliest = earliest;
        self
    }

    /// Sum of costs inside the current calendar period of `unit`
    pub fn total_for(&self, unit: TimeUnit, now: DateTime<Utc>) -> Decimal {
        let (start, end) = self.calendar.period_bounds(unit, now);
        saturating_sum(
            self.expenses
                .iter()
                .filter(|e| e.created_at >= start && e.created_at < end)
                .map(|e| e.cost),
        )
    }

    /// Mean cost of each period bucket, newest bucket first
    pub fn averages_for(&self, unit: TimeUnit) -> Vec<Decimal> {
        let buckets = Buckets::group_by(self.expenses.iter(), |e| {
            bucket_key(unit, self.calendar.local_date(e.created_at))
        });

        let averages: Vec<Decimal> = buckets
            .iter()
            .map(|(_, expenses)| {
                let sum = saturating_sum(expenses.iter().map(|e| e.cost));
                (sum / Decimal::from(expenses.len()))
                    .round_dp_with_strategy(AVERAGE_DP, RoundingStrategy::MidpointAwayFromZero)
            })
            .collect();

        debug!(unit = %unit, buckets = averages.len(), "Computed bucket averages");
        averages
    }

    /// Units of history since the earliest expense, never less than one
    pub fn duration_since(&self, unit: TimeUnit, now: DateTime<Utc>) -> Decimal {
        let Some(earliest) = self.earliest else {
            return Decimal::ONE;
        };
        let elapsed = Decimal::from((now - earliest).num_seconds());
        let units = elapsed / Decimal::from(unit.seconds());
        units.max(Decimal::ONE)
    }

    /// Sum of bucket averages spread over the length of the history
    pub fn average_for(&self, unit: TimeUnit, now: DateTime<Utc>) -> Decimal {
        let total = saturating_sum(self.averages_for(unit));
        let duration = self.duration_since(unit, now);
        debug!(unit = %unit, %total, %duration, "Computed overall average");
        total / duration
    }

    /// Whether the newest bucket's average beats the overall average
    pub fn is_above_average(&self, unit: TimeUnit, now: DateTime<Utc>) -> bool {
        match self.averages_for(unit).first() {
            Some(recent) => *recent > self.average_for(unit, now),
            None => false,
        }
    }

    pub fn unit_summary(&self, unit: TimeUnit, now: DateTime<Utc>) -> UnitSummary {
        let recent_average = self.averages_for(unit).first().copied();
        let average = self.average_for(unit, now);
        UnitSummary {
            unit,
            total: self.total_for(unit, now),
            average,
            recent_average,
            above_average: recent_average.is_some_and(|recent| recent > average),
        }
    }
}

/// Load an owner's history and summarize every unit
pub fn spending_summary<R: ExpenseRepository + ?Sized>(
    repo: &R,
    owner_id: &str,
    calendar: Calendar,
    now: DateTime<Utc>,
) -> Result<SpendingSummary> {
    let expenses = repo.expenses_for(owner_id, None)?;
    let earliest = repo.earliest(owner_id)?.map(|e| e.created_at);
    let aggregator = Aggregator::new(&expenses, calendar).with_earliest(earliest);

    Ok(SpendingSummary {
        owner_id: owner_id.to_string(),
        generated_at: now,
        expense_count: expenses.len(),
        units: TimeUnit::ALL
            .iter()
            .map(|&unit| aggregator.unit_summary(unit, now))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{dec, expense, expenses_days_ago, ts};
    use chrono::Duration;

    #[test]
    fn test_consecutive_days_give_single_buckets_newest_first() {
        let now = ts("2024-06-15 12:00:00");
        let expenses = expenses_days_ago(
            now,
            &[(2, "10", "first"), (1, "20", "second"), (0, "30", "third")],
        );
        let agg = Aggregator::new(&expenses, Calendar::utc());

        assert_eq!(agg.averages_for(TimeUnit::Day), vec![dec("30"), dec("20"), dec("10")]);
    }

    #[test]
    fn test_bucket_average_rounds_half_up() {
        let now = ts("2024-06-15 12:00:00");
        let expenses = vec![
            expense(1, "0.01", "a", now),
            expense(2, "0.02", "b", now - Duration::hours(1)),
        ];
        let agg = Aggregator::new(&expenses, Calendar::utc());
        // 0.015 rounds up
        assert_eq!(agg.averages_for(TimeUnit::Day), vec![dec("0.02")]);

        let expenses = vec![
            expense(1, "10", "a", now),
            expense(2, "10", "b", now),
            expense(3, "11", "c", now),
        ];
        let agg = Aggregator::new(&expenses, Calendar::utc());
        assert_eq!(agg.averages_for(TimeUnit::Day), vec![dec("10.33")]);
    }

    #[test]
    fn test_week_and_month_buckets() {
        // Fri 2024-06-14, Mon 2024-06-10, Sun 2024-06-09, Fri 2024-05-31
        let expenses = vec![
            expense(1, "10", "a", ts("2024-06-14 10:00:00")),
            expense(2, "20", "b", ts("2024-06-10 10:00:00")),
            expense(3, "6", "c", ts("2024-06-09 10:00:00")),
            expense(4, "4", "d", ts("2024-05-31 10:00:00")),
        ];
        let agg = Aggregator::new(&expenses, Calendar::utc());

        // ISO weeks 24, 23 and 22
        assert_eq!(
            agg.averages_for(TimeUnit::Week),
            vec![dec("15"), dec("6"), dec("4")]
        );
        assert_eq!(agg.averages_for(TimeUnit::Month), vec![dec("12"), dec("4")]);
    }

    #[test]
    fn test_same_day_different_years_are_separate_buckets() {
        let expenses = vec![
            expense(1, "10", "a", ts("2024-03-01 10:00:00")),
            expense(2, "30", "b", ts("2023-03-02 10:00:00")),
        ];
        let agg = Aggregator::new(&expenses, Calendar::utc());
        // Mar 1 2024 and Mar 2 2023 are both day 61 of their years
        assert_eq!(agg.averages_for(TimeUnit::Day).len(), 2);
    }

    #[test]
    fn test_total_for_month_straddling_boundaries() {
        let now = ts("2024-03-15 12:00:00");
        let expenses = vec![
            expense(1, "1000", "next month", ts("2024-04-01 00:00:00")),
            expense(2, "1.25", "last second", ts("2024-03-31 23:59:59")),
            expense(3, "2.50", "mid", ts("2024-03-15 08:00:00")),
            expense(4, "4", "first second", ts("2024-03-01 00:00:00")),
            expense(5, "500", "previous month", ts("2024-02-29 23:59:59")),
        ];
        let agg = Aggregator::new(&expenses, Calendar::utc());

        let expected: Decimal = expenses
            .iter()
            .filter(|e| {
                e.created_at >= ts("2024-03-01 00:00:00") && e.created_at <= ts("2024-03-31 23:59:59")
            })
            .map(|e| e.cost)
            .sum();
        assert_eq!(agg.total_for(TimeUnit::Month, now), expected);
        assert_eq!(agg.total_for(TimeUnit::Month, now), dec("7.75"));
    }

    #[test]
    fn test_total_for_day_and_week() {
        // 2024-03-15 is a Friday
        let now = ts("2024-03-15 12:00:00");
        let expenses = vec![
            expense(1, "3", "today", ts("2024-03-15 01:00:00")),
            expense(2, "5", "monday", ts("2024-03-11 00:00:00")),
            expense(3, "7", "last sunday", ts("2024-03-10 23:59:59")),
        ];
        let agg = Aggregator::new(&expenses, Calendar::utc());

        assert_eq!(agg.total_for(TimeUnit::Day, now), dec("3"));
        assert_eq!(agg.total_for(TimeUnit::Week, now), dec("8"));
        assert_eq!(agg.total_for(TimeUnit::Month, now), dec("15"));
    }

    #[test]
    fn test_single_expense_short_history_average_is_cost() {
        let now = ts("2024-06-15 12:00:00");
        let expenses = vec![expense(1, "10", "only", now - Duration::hours(5))];
        let agg = Aggregator::new(&expenses, Calendar::utc());

        for unit in TimeUnit::ALL {
            assert_eq!(agg.duration_since(unit, now), Decimal::ONE);
            assert_eq!(agg.average_for(unit, now), dec("10"));
        }
    }

    #[test]
    fn test_single_expense_long_history_average_divides() {
        let now = ts("2024-06-15 12:00:00");
        let expenses = vec![expense(1, "10", "only", now - Duration::days(4))];
        let agg = Aggregator::new(&expenses, Calendar::utc());

        assert_eq!(agg.duration_since(TimeUnit::Day, now), dec("4"));
        assert_eq!(agg.average_for(TimeUnit::Day, now), dec("2.5"));
        // Four days is still under one week
        assert_eq!(agg.average_for(TimeUnit::Week, now), dec("10"));
    }

    #[test]
    fn test_month_duration_is_thirty_days() {
        let now = ts("2024-06-15 12:00:00");
        let expenses = vec![expense(1, "90", "only", now - Duration::days(90))];
        let agg = Aggregator::new(&expenses, Calendar::utc());

        assert_eq!(agg.duration_since(TimeUnit::Month, now), dec("3"));
        assert_eq!(agg.average_for(TimeUnit::Month, now), dec("30"));
    }

    #[test]
    fn test_empty_history_degrades_gracefully() {
        let now = ts("2024-06-15 12:00:00");
        let agg = Aggregator::new(&[], Calendar::utc());

        for unit in TimeUnit::ALL {
            assert!(agg.averages_for(unit).is_empty());
            assert_eq!(agg.duration_since(unit, now), Decimal::ONE);
            assert_eq!(agg.average_for(unit, now), Decimal::ZERO);
            assert_eq!(agg.total_for(unit, now), Decimal::ZERO);
            assert!(!agg.is_above_average(unit, now));
        }
    }

    #[test]
    fn test_is_above_average() {
        let now = ts("2024-06-15 12:00:00");
        // Ten quiet days then a big one today
        let mut entries: Vec<(i64, &str, &str)> = (1..=10).map(|d| (d, "5", "small")).collect();
        entries.push((0, "100", "big"));
        let expenses = expenses_days_ago(now, &entries);
        let agg = Aggregator::new(&expenses, Calendar::utc());

        // (100 + 10 * 5) / 10 days = 15
        assert_eq!(agg.average_for(TimeUnit::Day, now), dec("15"));
        assert!(agg.is_above_average(TimeUnit::Day, now));

        let expenses = expenses_days_ago(now, &[(0, "1", "tiny"), (1, "50", "big")]);
        let agg = Aggregator::new(&expenses, Calendar::utc());
        assert!(!agg.is_above_average(TimeUnit::Day, now));
    }

    #[test]
    fn test_with_earliest_overrides_slice() {
        let now = ts("2024-06-15 12:00:00");
        let expenses = vec![expense(1, "10", "recent", now)];
        let agg = Aggregator::new(&expenses, Calendar::utc())
            .with_earliest(Some(now - Duration::days(5)));

        assert_eq!(agg.average_for(TimeUnit::Day, now), dec("2"));
    }

    #[test]
    fn test_huge_costs_saturate_instead_of_overflowing() {
        let now = ts("2024-06-15 12:00:00");
        let expenses = vec![
            expense(1, "50000000000000000000000000000", "a", now),
            expense(2, "50000000000000000000000000000", "b", now - Duration::hours(1)),
        ];
        let agg = Aggregator::new(&expenses, Calendar::utc());

        assert_eq!(agg.total_for(TimeUnit::Day, now), Decimal::MAX);
        assert_eq!(agg.averages_for(TimeUnit::Day).len(), 1);
        assert!(agg.average_for(TimeUnit::Day, now) > Decimal::ZERO);
        assert!(!agg.unit_summary(TimeUnit::Month, now).total.is_zero());
    }

    #[test]
    fn test_saturating_sum() {
        assert_eq!(saturating_sum([dec("1.50"), dec("2.25")]), dec("3.75"));
        assert_eq!(saturating_sum(Vec::<Decimal>::new()), Decimal::ZERO);
        assert_eq!(saturating_sum([Decimal::MAX, Decimal::ONE]), Decimal::MAX);
    }

    #[test]
    fn test_unit_summary() {
        let now = ts("2024-06-15 12:00:00");
        let expenses = expenses_days_ago(now, &[(0, "30", "a"), (1, "10", "b")]);
        let agg = Aggregator::new(&expenses, Calendar::utc());
        let summary = agg.unit_summary(TimeUnit::Day, now);

        assert_eq!(summary.total, dec("30"));
        assert_eq!(summary.recent_average, Some(dec("30")));
        assert_eq!(summary.average, dec("40"));
        assert!(!summary.above_average);
    }
}
