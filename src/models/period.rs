//! Reporting periods
//!
//! Three shapes of time window are used across the API:
//! named trailing ranges ending today (`week` = the last 7 days),
//! calendar months for charts, and explicit inclusive windows.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A named trailing range ending today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    Today,
    Week,
    Month,
    Quarter,
    Year,
}

impl DateRange {
    pub fn all() -> &'static [Self] {
        &[Self::Today, Self::Week, Self::Month, Self::Quarter, Self::Year]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }

    /// How far back the range reaches from today
    pub fn days_back(&self) -> i64 {
        match self {
            Self::Today => 0,
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
            Self::Year => 365,
        }
    }

    /// Divisor used for per-day averages
    pub fn average_days(&self) -> i64 {
        match self {
            Self::Today => 1,
            other => other.days_back(),
        }
    }

    /// Number of calendar months shown in trend charts for this range
    pub fn trend_months(&self) -> u32 {
        match self {
            Self::Today | Self::Week => 1,
            Self::Month => 3,
            Self::Quarter => 6,
            Self::Year => 12,
        }
    }

    /// Inclusive window `[today - days_back, today]`
    pub fn window(&self, today: NaiveDate) -> DateWindow {
        DateWindow {
            start: today - Duration::days(self.days_back()),
            end: today,
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateRange {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "quarter" => Ok(Self::Quarter),
            "year" => Ok(Self::Year),
            other => Err(PeriodParseError(other.to_string())),
        }
    }
}

/// An inclusive `[start, end]` date window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The calendar quarter containing `date`
    pub fn quarter_containing(date: NaiveDate) -> Self {
        let mut first = MonthPeriod::containing(date);
        for _ in 0..(date.month0() % 3) {
            first = first.prev();
        }
        let last = first.next().next();
        Self::new(first.start_date(), last.end_date())
    }

    /// The calendar year containing `date`
    pub fn year_containing(date: NaiveDate) -> Self {
        let start = date - Duration::days(date.ordinal0() as i64);
        let past_year_end = start + Duration::days(366);
        let next_start = past_year_end - Duration::days(past_year_end.ordinal0() as i64);
        Self::new(start, next_start - Duration::days(1))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days covered, counting both ends (zero for inverted windows)
    pub fn days(&self) -> i64 {
        ((self.end - self.start).num_days() + 1).max(0)
    }

    /// The window of equal length that ends the day before this one starts
    pub fn previous(&self) -> Self {
        let end = self.start - Duration::days(1);
        let start = end - Duration::days(self.days() - 1);
        Self { start, end }
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// A calendar month, identified by its first day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthPeriod {
    start: NaiveDate,
}

impl MonthPeriod {
    /// The month containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            start: date - Duration::days(date.day0() as i64),
        }
    }

    /// The `count` months ending with the month of `today`, oldest first
    pub fn last_n(today: NaiveDate, count: u32) -> Vec<Self> {
        let mut months = Vec::with_capacity(count as usize);
        let mut current = Self::containing(today);
        for _ in 0..count {
            months.push(current);
            current = current.prev();
        }
        months.reverse();
        months
    }

    pub fn year(&self) -> i32 {
        self.start.year()
    }

    pub fn month(&self) -> u32 {
        self.start.month()
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the month
    pub fn end_date(&self) -> NaiveDate {
        self.next().start - Duration::days(1)
    }

    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.start_date(), self.end_date())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.window().contains(date)
    }

    pub fn next(&self) -> Self {
        Self::containing(self.start + Duration::days(31))
    }

    pub fn prev(&self) -> Self {
        Self::containing(self.start - Duration::days(1))
    }

    /// Short English month name, e.g. "Jan"
    pub fn label(&self) -> &'static str {
        MONTH_LABELS[self.start.month0() as usize]
    }
}

impl fmt::Display for MonthPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// Error for unrecognised period names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodParseError(pub String);

impl fmt::Display for PeriodParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown period '{}' (expected today, week, month, quarter or year)",
            self.0
        )
    }
}

impl std::error::Error for PeriodParseError {}
