//! Calendar arithmetic shared by the aggregators and the report renderer.
//!
//! All dates are plain calendar dates ([`NaiveDate`]); no timezone conversion
//! happens anywhere in the pipeline.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate, Weekday};

use crate::error::{ComputeError, Result};

/// Upper bound on the number of months a history request may span.
pub const MAX_HISTORY_MONTHS: usize = 24;

/// A calendar month, parsed from and printed as `YYYY-MM`.
///
/// Only months whose first and last day are representable can be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
    first: NaiveDate,
    last: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(ComputeError::validation(format!(
                "month must be between 1 and 12, got {}",
                month
            )));
        }
        let (first, last) = month_bounds(year, month).ok_or_else(|| {
            ComputeError::validation(format!("{:04}-{:02} is out of range", year, month))
        })?;
        Ok(Self {
            year,
            month,
            first,
            last,
        })
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    /// The month after this one, wrapping December into January of the next year.
    fn succ(self) -> Option<Self> {
        let next = self.last.succ_opt()?;
        YearMonth::new(next.year(), next.month()).ok()
    }

    pub fn first_day(self) -> NaiveDate {
        self.first
    }

    pub fn last_day(self) -> NaiveDate {
        self.last
    }

    pub fn days(self) -> u32 {
        self.last.day()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| ComputeError::validation(format!("expected YYYY-MM, got '{}'", s)))?;
        let year: i32 = year
            .parse()
            .map_err(|_| ComputeError::validation(format!("invalid year in '{}'", s)))?;
        let month: u32 = month
            .parse()
            .map_err(|_| ComputeError::validation(format!("invalid month in '{}'", s)))?;
        YearMonth::new(year, month)
    }
}

/// First and last day of a month. The last day is the day before the first
/// day of the following month, so both must be representable.
fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((first, last))
}

/// Expands an inclusive month range into ordered months.
///
/// `start == end` yields one month, `start > end` and ranges longer than
/// [`MAX_HISTORY_MONTHS`] are rejected.
pub fn month_range(start: YearMonth, end: YearMonth) -> Result<Vec<YearMonth>> {
    if start > end {
        return Err(ComputeError::validation(format!(
            "start month {} is after end month {}",
            start, end
        )));
    }

    let span = (end.year - start.year) as i64 * 12 + end.month as i64 - start.month as i64 + 1;
    if span > MAX_HISTORY_MONTHS as i64 {
        return Err(ComputeError::validation(format!(
            "range {}..{} spans {} months, at most {} allowed",
            start, end, span, MAX_HISTORY_MONTHS
        )));
    }

    let mut months = Vec::with_capacity(span as usize);
    let mut current = Some(start);
    while let Some(month) = current {
        months.push(month);
        if month == end {
            break;
        }
        current = month.succ();
    }
    Ok(months)
}

/// Zero-padded `YYYY-MM-DD` key of a calendar date.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn is_sunday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sun
}
