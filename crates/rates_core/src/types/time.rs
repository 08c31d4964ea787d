//! Time types and Day Count Conventions.
//!
//! This module provides:
//! - `Date`: Type-safe date wrapper around chrono::NaiveDate
//! - `DayCountConvention`: Year fraction conventions used by curves and legs
//!
//! Business-day calendars are not modelled: tenor arithmetic produces
//! unadjusted dates.
//!
//! # Examples
//!
//! ```
//! use rates_core::types::time::{Date, DayCountConvention};
//!
//! let start = Date::from_ymd(2024, 1, 1).unwrap();
//! let end = Date::from_ymd(2024, 7, 1).unwrap();
//!
//! let yf = DayCountConvention::ActualActual360.year_fraction_dates(start, end);
//! assert!((yf - 0.5056).abs() < 0.001);
//! ```

use chrono::{Datelike, Duration, Local, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

use super::error::DateError;
use super::tenor::{Tenor, TenorUnit};

/// Type-safe date wrapper around chrono::NaiveDate.
///
/// Serialises as an ISO 8601 string (YYYY-MM-DD).
///
/// # Examples
///
/// ```
/// use rates_core::types::time::Date;
///
/// let date = Date::from_ymd(2024, 6, 15).unwrap();
/// let parsed: Date = "2024-06-15".parse().unwrap();
/// assert_eq!(date, parsed);
///
/// let later = Date::from_ymd(2024, 6, 25).unwrap();
/// assert_eq!(later - date, 10);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a Date from year, month, and day components.
    ///
    /// Returns `Err(DateError::InvalidDate)` for impossible dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or(DateError::InvalidDate { year, month, day })
    }

    /// Returns today's date based on local system time.
    pub fn today() -> Self {
        Date(Local::now().date_naive())
    }

    /// Parses a date from ISO 8601 format string (YYYY-MM-DD).
    pub fn parse(s: &str) -> Result<Self, DateError> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Date)
            .map_err(|e| DateError::ParseError(e.to_string()))
    }

    /// Returns the underlying NaiveDate.
    pub fn into_inner(self) -> NaiveDate {
        self.0
    }

    /// Returns the year component.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the month component (1-12).
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the day component (1-31).
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Returns the weekday.
    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// Shifts the date by a signed number of calendar days.
    pub fn add_days(self, days: i64) -> Result<Self, DateError> {
        self.0
            .checked_add_signed(Duration::days(days))
            .map(Date)
            .ok_or_else(|| DateError::OutOfRange(format!("{} + {}D", self, days)))
    }

    /// Adds calendar months, clamping to the last day of the target month.
    ///
    /// ```
    /// use rates_core::types::time::Date;
    ///
    /// let jan31 = Date::from_ymd(2024, 1, 31).unwrap();
    /// assert_eq!(jan31.add_months(1).unwrap(), Date::from_ymd(2024, 2, 29).unwrap());
    /// ```
    pub fn add_months(self, months: u32) -> Result<Self, DateError> {
        self.0
            .checked_add_months(Months::new(months))
            .map(Date)
            .ok_or_else(|| DateError::OutOfRange(format!("{} + {}M", self, months)))
    }

    /// Returns the unadjusted maturity reached by rolling `tenor` forward.
    ///
    /// ```
    /// use rates_core::types::time::Date;
    /// use rates_core::types::Tenor;
    ///
    /// let start = Date::from_ymd(2024, 3, 15).unwrap();
    /// let tenor: Tenor = "18M".parse().unwrap();
    /// assert_eq!(start.add_tenor(tenor).unwrap(), Date::from_ymd(2025, 9, 15).unwrap());
    /// ```
    pub fn add_tenor(self, tenor: Tenor) -> Result<Self, DateError> {
        match tenor.unit() {
            TenorUnit::Day => self.add_days(i64::from(tenor.count())),
            TenorUnit::Week => self.add_days(7 * i64::from(tenor.count())),
            TenorUnit::Month => self.add_months(tenor.count()),
            TenorUnit::Year => self.add_months(12 * tenor.count()),
        }
    }

    /// Returns the Monday starting this date's week.
    pub fn start_of_week(self) -> Result<Self, DateError> {
        let offset = self.0.weekday().num_days_from_monday();
        self.add_days(-i64::from(offset))
    }

    /// Returns the first day of this date's month.
    pub fn start_of_month(self) -> Result<Self, DateError> {
        Date::from_ymd(self.year(), self.month(), 1)
    }

    /// Returns January 1st of this date's year.
    pub fn start_of_year(self) -> Result<Self, DateError> {
        Date::from_ymd(self.year(), 1, 1)
    }
}

impl Sub for Date {
    type Output = i64;

    /// Returns the number of days between two dates.
    fn sub(self, other: Self) -> i64 {
        (self.0 - other.0).num_days()
    }
}

impl FromStr for Date {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, DateError> {
        Date::parse(s)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Date(date)
    }
}

/// Day Count Convention (year fraction convention).
///
/// # Variants
/// - `ActualActual365`: Actual days / 365
/// - `ActualActual360`: Actual days / 360 (money-market and SOFR swaps)
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayCountConvention {
    /// Actual/365 Fixed: actual_days / 365.0
    #[serde(rename = "ACT/365")]
    ActualActual365,

    /// Actual/360: actual_days / 360.0
    #[serde(rename = "ACT/360")]
    ActualActual360,
}

impl DayCountConvention {
    /// Returns the standard convention name.
    ///
    /// ```
    /// use rates_core::types::time::DayCountConvention;
    ///
    /// assert_eq!(DayCountConvention::ActualActual360.name(), "ACT/360");
    /// ```
    pub fn name(&self) -> &'static str {
        match self {
            DayCountConvention::ActualActual365 => "ACT/365",
            DayCountConvention::ActualActual360 => "ACT/360",
        }
    }

    /// Year fraction between two dates; negative when `start > end`.
    pub fn year_fraction_dates(&self, start: Date, end: Date) -> f64 {
        let days = (end - start) as f64;
        match self {
            DayCountConvention::ActualActual365 => days / 365.0,
            DayCountConvention::ActualActual360 => days / 360.0,
        }
    }
}

impl Default for DayCountConvention {
    fn default() -> Self {
        DayCountConvention::ActualActual360
    }
}

impl fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
