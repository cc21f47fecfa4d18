use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::date::{Clock, last_tuesday, week_start};
use crate::error::{Error, Result};

/// A release week, identified by its Tuesday.
///
/// The repository path is always `data/<year>/<YYYY-MM-DD>` for that Tuesday.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedWeek {
    date: NaiveDate,
    year: i32,
    path: String,
}

impl ResolvedWeek {
    /// The release week containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let date = last_tuesday(date);
        let year = date.year();
        Self {
            date,
            year,
            path: format!("data/{year}/{date}"),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for ResolvedWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date)
    }
}

/// How the caller identifies a week: a date, or a year with an optional
/// week number. Exactly one of `date` and `year` must be set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekQuery {
    pub date: Option<NaiveDate>,
    pub year: Option<i32>,
    pub week: Option<u32>,
}

impl WeekQuery {
    pub fn date(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::default()
        }
    }

    pub fn year_week(year: i32, week: u32) -> Self {
        Self {
            year: Some(year),
            week: Some(week),
            ..Self::default()
        }
    }
}

pub fn resolve(query: WeekQuery, clock: &dyn Clock) -> Result<ResolvedWeek> {
    match query {
        WeekQuery {
            date: Some(_),
            year: Some(_),
            ..
        }
        | WeekQuery {
            date: Some(_),
            week: Some(_),
            ..
        } => Err(Error::InvalidArguments(
            "give either a date or a year (with optional week), not both".into(),
        )),
        WeekQuery {
            date: Some(date), ..
        } => Ok(ResolvedWeek::containing(date)),
        WeekQuery {
            year: Some(year),
            week: Some(week),
            ..
        } => resolve_year_week(year, week, clock.today()),
        WeekQuery {
            year: Some(year),
            week: None,
            ..
        } => resolve_year(year, clock.today()),
        WeekQuery { .. } => Err(Error::InvalidArguments(
            "a date or a year is required".into(),
        )),
    }
}

fn resolve_year_week(year: i32, week: u32, today: NaiveDate) -> Result<ResolvedWeek> {
    let start = week_start(year, week)
        .ok_or_else(|| Error::WeekOutOfRange(format!("week {week} of {year}")))?;
    let resolved = ResolvedWeek::containing(start);

    if resolved.year != year {
        return Err(Error::WeekOutOfRange(format!(
            "week {week} of {year} falls on {}, outside {year}",
            resolved.date
        )));
    }
    if resolved.date > today {
        return Err(Error::WeekOutOfRange(format!(
            "week {week} of {year} ({}) has not been released yet",
            resolved.date
        )));
    }
    Ok(resolved)
}

/// Most recent release week of `year` as of `today`.
fn resolve_year(year: i32, today: NaiveDate) -> Result<ResolvedWeek> {
    let dec31 = NaiveDate::from_ymd_opt(year, 12, 31)
        .ok_or_else(|| Error::WeekOutOfRange(format!("year {year}")))?;
    let resolved = ResolvedWeek::containing(dec31.min(today));
    if resolved.year != year {
        return Err(Error::WeekOutOfRange(format!(
            "no release week of {year} exists as of {today}"
        )));
    }
    Ok(resolved)
}
