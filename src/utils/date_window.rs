use chrono::{DateTime, Months, NaiveDate, NaiveTime, Utc};

use crate::error::AppError;
use crate::utils::clock::Clock;

const DAY_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Half-open range of calendar days: `start <= date < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// `[date 00:00Z, date+1 00:00Z)`
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date.succ_opt().unwrap_or(NaiveDate::MAX),
        }
    }

    /// `[first of month, first of next month)`
    pub fn month(first: NaiveDate) -> Self {
        Self {
            start: first,
            end: first
                .checked_add_months(Months::new(1))
                .unwrap_or(NaiveDate::MAX),
        }
    }
}

fn blank_to_none(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (its UTC date is used).
pub fn parse_day(raw: &str) -> Result<NaiveDate, AppError> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, DAY_FORMAT) {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| AppError::validation(format!("Invalid date '{raw}', expected YYYY-MM-DD")))
}

/// Resolves an optional request date, falling back to the clock's today.
pub fn resolve_day(raw: Option<&str>, clock: &dyn Clock) -> Result<NaiveDate, AppError> {
    match blank_to_none(raw) {
        Some(raw) => parse_day(raw),
        None => Ok(clock.today()),
    }
}

/// Parses `YYYY-MM` into its month window.
pub fn parse_year_month(raw: &str) -> Result<DateWindow, AppError> {
    let raw = raw.trim();

    NaiveDate::parse_from_str(&format!("{raw}-01"), DAY_FORMAT)
        .map(DateWindow::month)
        .map_err(|_| AppError::validation(format!("Invalid month '{raw}', expected YYYY-MM")))
}

/// `HH:MM`; a missing or empty value means "not submitted".
pub fn parse_time_of_day(raw: Option<&str>) -> Result<Option<NaiveTime>, AppError> {
    blank_to_none(raw)
        .map(|raw| {
            NaiveTime::parse_from_str(raw, TIME_FORMAT)
                .map_err(|_| AppError::validation(format!("Invalid time '{raw}', expected HH:MM")))
        })
        .transpose()
}

pub fn combine(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    date.and_time(time).and_utc()
}
