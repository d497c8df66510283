//! Date parsing and reporting interval resolution.

use crate::core::error::ReportError;
use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Length of the look-back window used by the category spend report.
pub const LOOKBACK_DAYS: i64 = 90;

/// An inclusive `[start, end]` interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn contains(&self, moment: NaiveDateTime) -> bool {
        self.start <= moment && moment <= self.end
    }
}

/// How a single reference timestamp is turned into a reporting interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalRule {
    /// From the 1st of the month at 00:00:01 up to the reference itself.
    #[default]
    MonthStart,
    /// From the 1st of the month (reference time of day kept) up to the
    /// midnight following the reference day.
    MonthToNextDay,
    /// The 90 days leading up to the reference.
    Lookback90,
}

impl Display for IntervalRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                IntervalRule::MonthStart => "month_start",
                IntervalRule::MonthToNextDay => "month_to_next_day",
                IntervalRule::Lookback90 => "lookback_90",
            }
        )
    }
}

impl FromStr for IntervalRule {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "month_start" => Ok(IntervalRule::MonthStart),
            "month_to_next_day" => Ok(IntervalRule::MonthToNextDay),
            "lookback_90" => Ok(IntervalRule::Lookback90),
            _ => Err(anyhow::anyhow!("Invalid interval rule: {}", s)),
        }
    }
}

/// Parses a reference timestamp such as `25.11.2021 21:29:17`.
pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime> {
    debug!(input, "Parsing reference timestamp");
    NaiveDateTime::parse_from_str(input.trim(), TIMESTAMP_FORMAT).map_err(|_| {
        ReportError::InvalidDate {
            input: input.to_string(),
            expected: TIMESTAMP_FORMAT,
        }
        .into()
    })
}

/// Like [`parse_timestamp`] but also accepts a bare `dd.mm.yyyy` date,
/// which is taken as midnight of that day.
pub fn parse_reference_date(input: &str) -> Result<NaiveDateTime> {
    let trimmed = input.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT) {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| {
            ReportError::InvalidDate {
                input: input.to_string(),
                expected: DATE_FORMAT,
            }
            .into()
        })
}

/// Lenient parsing for cells inside the table: `None` drops the row.
pub fn parse_cell_timestamp(cell: Option<&str>) -> Option<NaiveDateTime> {
    let cell = cell?.trim();
    NaiveDateTime::parse_from_str(cell, TIMESTAMP_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(cell, DATE_FORMAT)
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

pub fn parse_cell_date(cell: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(cell?.trim(), DATE_FORMAT).ok()
}

pub fn resolve(reference: &str, rule: IntervalRule) -> Result<DateRange> {
    let end = parse_timestamp(reference)?;
    let range = resolve_at(end, rule);
    debug!(start = %range.start, end = %range.end, %rule, "Resolved interval");
    Ok(range)
}

pub fn resolve_at(reference: NaiveDateTime, rule: IntervalRule) -> DateRange {
    match rule {
        IntervalRule::MonthStart => {
            let one_second = NaiveTime::from_hms_opt(0, 0, 1).unwrap_or(NaiveTime::MIN);
            DateRange {
                start: first_of_month(reference).and_time(one_second),
                end: reference,
            }
        }
        IntervalRule::MonthToNextDay => DateRange {
            start: first_of_month(reference).and_time(reference.time()),
            end: reference.date().and_time(NaiveTime::MIN) + Duration::days(1),
        },
        IntervalRule::Lookback90 => DateRange {
            start: reference - Duration::days(LOOKBACK_DAYS),
            end: reference,
        },
    }
}

fn first_of_month(moment: NaiveDateTime) -> NaiveDate {
    moment.date().with_day(1).unwrap_or(moment.date())
}
