use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};
use chrono_tz::America::New_York;

use crate::error::{Error, Result};

/// Source of "today". Injected wherever the current date matters so callers
/// can pin it.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Reads the calendar date in New York, where releases are dated, from the
/// system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        release_calendar_date(Utc::now())
    }
}

fn release_calendar_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&New_York).date_naive()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let trimmed = s.trim();
    // chrono accepts unpadded fields; release directories never use them.
    if trimmed.len() != 10 {
        return Err(Error::InvalidDateFormat(trimmed.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| Error::InvalidDateFormat(trimmed.to_string()))
}

/// Most recent Tuesday on or before `date`.
pub fn last_tuesday(date: NaiveDate) -> NaiveDate {
    let from_monday = date.weekday().num_days_from_monday();
    let tuesday = Weekday::Tue.num_days_from_monday();
    let back = (from_monday + 7 - tuesday) % 7;
    date - Days::new(u64::from(back))
}

/// First day of the `week`-th seven-day block counted from Jan 1 of `year`.
///
/// Week numbers are 1-based and are not ISO weeks. Returns `None` for week 0
/// or when the arithmetic leaves chrono's representable range.
pub fn week_start(year: i32, week: u32) -> Option<NaiveDate> {
    if week == 0 {
        return None;
    }
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
    jan1.checked_add_days(Days::new(u64::from(week - 1) * 7))
}
