use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key of one statement cycle on a revolving-credit instrument, ordered
/// chronologically and rendered as `YYYY-MM`.
///
/// A purchase is attributed to a cycle once, at creation time, and the key is
/// never recomputed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CycleKey {
    year: i32,
    month: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid cycle key `{0}`, expected YYYY-MM")]
pub struct ParseCycleKeyError(String);

impl CycleKey {
    pub fn new(year: i32, month: u32) -> Option<CycleKey> {
        if (1..=12).contains(&month) {
            Some(CycleKey { year, month })
        } else {
            None
        }
    }

    /// Cycle named by the given date's calendar month.
    pub fn of(date: NaiveDate) -> CycleKey {
        CycleKey {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Maps a purchase to its statement cycle: purchases after the closing day
    /// roll into the next month's cycle.
    pub fn for_purchase(purchase: NaiveDate, closing_day: u32) -> CycleKey {
        let key = CycleKey::of(purchase);
        if purchase.day() > closing_day {
            key.next()
        } else {
            key
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn next(self) -> CycleKey {
        if self.month == 12 {
            CycleKey {
                year: self.year + 1,
                month: 1,
            }
        } else {
            CycleKey {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap()
    }

    /// Places the invoice due date on `due_day` of the cycle month, clamped to
    /// the month's last day.
    pub fn due_date(self, due_day: u32) -> NaiveDate {
        let day = due_day.clamp(1, days_in_month(self.year, self.month));
        NaiveDate::from_ymd_opt(self.year, self.month, day).unwrap()
    }

    /// Due date rolled forward one month when it already lies before `today`.
    /// Used when synthesizing a due date at invoice-closing time, never at
    /// purchase time.
    pub fn due_date_rolled(self, due_day: u32, today: NaiveDate) -> NaiveDate {
        let due = self.due_date(due_day);
        if due < today {
            add_months(due, 1)
        } else {
            due
        }
    }
}

impl fmt::Display for CycleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for CycleKey {
    type Err = ParseCycleKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseCycleKeyError(value.to_string());
        let (year, month) = value.split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        CycleKey::new(year, month).ok_or_else(invalid)
    }
}

impl From<CycleKey> for String {
    fn from(key: CycleKey) -> String {
        key.to_string()
    }
}

impl TryFrom<String> for CycleKey {
    type Error = ParseCycleKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Steps a date by whole months, clamping the day-of-month to the target
/// month's length so it never overflows into the following month.
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month() as i32 + months;
    let mut day = date.day();
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    day = day.min(days_in_month(year, month as u32));
    NaiveDate::from_ymd_opt(year, month as u32, day).unwrap()
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap());
    let last_current = first_next - Duration::days(1);
    last_current.day()
}
