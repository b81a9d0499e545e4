//! Clocks and calendar periods
//!
//! Timestamps are stored in UTC. Everything calendar-shaped (what "today" is,
//! where a week starts, which month an expense falls in) is evaluated in the
//! calendar's fixed UTC offset.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, Offset, Utc, Weekday};

use crate::models::TimeUnit;

/// Source of the current time
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self(now)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Calendar used to resolve local dates and period boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    pub offset: FixedOffset,
    pub week_start: Weekday,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl Calendar {
    /// UTC calendar with Monday-start weeks
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
            week_start: Weekday::Mon,
        }
    }

    pub fn new(offset: FixedOffset, week_start: Weekday) -> Self {
        Self { offset, week_start }
    }

    /// Local calendar date of a timestamp
    pub fn local_date(&self, ts: DateTime<Utc>) -> NaiveDate {
        ts.with_timezone(&self.offset).date_naive()
    }

    /// UTC instant of local midnight at the start of `date`
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let local_midnight = date.and_time(chrono::NaiveTime::MIN);
        (local_midnight - Duration::seconds(self.offset.local_minus_utc() as i64)).and_utc()
    }

    /// First local date of the period of `unit` that contains `date`
    pub fn period_start(&self, unit: TimeUnit, date: NaiveDate) -> NaiveDate {
        match unit {
            TimeUnit::Day => date,
            TimeUnit::Week => {
                let back = (date.weekday().num_days_from_monday() + 7
                    - self.week_start.num_days_from_monday())
                    % 7;
                date - Duration::days(back as i64)
            }
            TimeUnit::Month => date - Duration::days(date.day0() as i64),
        }
    }

    /// The `[start, end)` UTC bounds of the period of `unit` containing `now`
    pub fn period_bounds(&self, unit: TimeUnit, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.period_start(unit, self.local_date(now));
        let end = match unit {
            TimeUnit::Day => start + Duration::days(1),
            TimeUnit::Week => start + Duration::days(7),
            TimeUnit::Month => start
                .checked_add_months(Months::new(1))
                .unwrap_or(NaiveDate::MAX),
        };
        (self.start_of_day(start), self.start_of_day(end))
    }

    /// Whether `ts` falls in the same period of `unit` as `now`
    pub fn in_current_period(&self, unit: TimeUnit, now: DateTime<Utc>, ts: DateTime<Utc>) -> bool {
        let (start, end) = self.period_bounds(unit, now);
        ts >= start && ts < end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ts;

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::at(ts("2024-03-15 12:00:00"));
        assert_eq!(clock.now(), ts("2024-03-15 12:00:00"));
        assert_eq!((&clock).now(), ts("2024-03-15 12:00:00"));
    }

    #[test]
    fn test_day_bounds_utc() {
        let cal = Calendar::utc();
        let (start, end) = cal.period_bounds(TimeUnit::Day, ts("2024-03-15 18:30:00"));
        assert_eq!(start, ts("2024-03-15 00:00:00"));
        assert_eq!(end, ts("2024-03-16 00:00:00"));
    }

    #[test]
    fn test_week_bounds_monday_start() {
        // 2024-03-15 is a Friday
        let cal = Calendar::utc();
        let (start, end) = cal.period_bounds(TimeUnit::Week, ts("2024-03-15 09:00:00"));
        assert_eq!(start, ts("2024-03-11 00:00:00"));
        assert_eq!(end, ts("2024-03-18 00:00:00"));
    }

    #[test]
    fn test_week_bounds_sunday_start() {
        let cal = Calendar::new(FixedOffset::east_opt(0).unwrap(), Weekday::Sun);
        let (start, _) = cal.period_bounds(TimeUnit::Week, ts("2024-03-15 09:00:00"));
        assert_eq!(start, ts("2024-03-10 00:00:00"));

        // A Sunday is the first day of its own week
        let (start, _) = cal.period_bounds(TimeUnit::Week, ts("2024-03-17 09:00:00"));
        assert_eq!(start, ts("2024-03-17 00:00:00"));
    }

    #[test]
    fn test_month_bounds_december() {
        let cal = Calendar::utc();
        let (start, end) = cal.period_bounds(TimeUnit::Month, ts("2023-12-31 23:59:59"));
        assert_eq!(start, ts("2023-12-01 00:00:00"));
        assert_eq!(end, ts("2024-01-01 00:00:00"));
    }

    #[test]
    fn test_month_bounds_leap_february() {
        let cal = Calendar::utc();
        let (start, end) = cal.period_bounds(TimeUnit::Month, ts("2024-02-10 00:00:00"));
        assert_eq!(start, ts("2024-02-01 00:00:00"));
        assert_eq!(end, ts("2024-03-01 00:00:00"));
    }

    #[test]
    fn test_offset_shifts_local_date() {
        let cal = Calendar::new(FixedOffset::east_opt(2 * 3600).unwrap(), Weekday::Mon);
        // 23:30 UTC is already the next day at +02:00
        let date = cal.local_date(ts("2024-03-15 23:30:00"));
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());

        let (start, end) = cal.period_bounds(TimeUnit::Day, ts("2024-03-15 23:30:00"));
        assert_eq!(start, ts("2024-03-15 22:00:00"));
        assert_eq!(end, ts("2024-03-16 22:00:00"));
    }

    #[test]
    fn test_in_current_period_is_half_open() {
        let cal = Calendar::utc();
        let now = ts("2024-03-15 12:00:00");
        assert!(cal.in_current_period(TimeUnit::Month, now, ts("2024-03-01 00:00:00")));
        assert!(cal.in_current_period(TimeUnit::Month, now, ts("2024-03-31 23:59:59")));
        assert!(!cal.in_current_period(TimeUnit::Month, now, ts("2024-04-01 00:00:00")));
        assert!(!cal.in_current_period(TimeUnit::Month, now, ts("2024-02-29 23:59:59")));
    }
}
