// src/matching/duration.rs
//! Converts raw employment duration strings ("Jan 2019 - Present · 5 yrs")
//! into concrete date intervals.

use crate::core::clock::{Clock, SystemClock};
use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};

static MONTH_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+(\d{4})")
        .expect("valid regex")
});
static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{4})").expect("valid regex"));

/// Start/end pair for one duration; either side may be unresolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Interval {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl Interval {
    pub fn unresolved() -> Self {
        Self::default()
    }

    /// Both bounds, when both are present. Their order is not checked.
    pub fn resolved(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((self.start?, self.end?))
    }
}

#[derive(Clone)]
pub struct DurationParser {
    clock: Arc<dyn Clock>,
}

impl Default for DurationParser {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl DurationParser {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn parse(&self, raw: &str) -> Interval {
        let cleaned = raw.split('·').next().unwrap_or_default().trim();
        if cleaned.is_empty() {
            return Interval::unresolved();
        }
        let is_present = cleaned.to_lowercase().contains("present");
        let now = self.clock.now().naive_utc();

        let months: Vec<NaiveDate> = MONTH_YEAR_RE
            .captures_iter(cleaned)
            .filter_map(|caps| {
                let month = month_number(&caps[1])?;
                let year = caps[2].parse::<i32>().ok()?;
                NaiveDate::from_ymd_opt(year, month, 1)
            })
            .collect();

        if let Some(first) = months.first() {
            let end = if is_present {
                Some(now)
            } else {
                let last = months.get(1).unwrap_or(first);
                end_of_month(*last).map(midnight)
            };
            return Interval {
                start: Some(midnight(*first)),
                end,
            };
        }

        let years: Vec<i32> = YEAR_RE
            .captures_iter(cleaned)
            .filter_map(|caps| caps[1].parse::<i32>().ok())
            .collect();

        if let Some(first) = years.first() {
            let end = if is_present {
                Some(now)
            } else {
                let last = years.get(1).unwrap_or(first);
                NaiveDate::from_ymd_opt(*last, 12, 31).map(midnight)
            };
            return Interval {
                start: NaiveDate::from_ymd_opt(*first, 1, 1).map(midnight),
                end,
            };
        }

        Interval::unresolved()
    }
}

fn month_number(abbrev: &str) -> Option<u32> {
    let month = match abbrev.to_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Last day of the month `first_of_month` belongs to: one month forward, one day back.
fn end_of_month(first_of_month: NaiveDate) -> Option<NaiveDate> {
    first_of_month
        .with_day(1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}
