use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, Duration, Month};

use crate::{UtcDateTime, ValidationError};

/// Historical window selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoricalRange {
    #[default]
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1w")]
    OneWeek,
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "1y")]
    OneYear,
}

impl HistoricalRange {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneDay => "1d",
            Self::OneWeek => "1w",
            Self::OneMonth => "1m",
            Self::OneYear => "1y",
        }
    }

    /// Window ending at `now`. Month and year steps that land on a day the
    /// target month lacks (31 March minus one month) clamp to that month's
    /// last day.
    pub fn window_ending_at(self, now: UtcDateTime) -> DateWindow {
        let end = now.date();
        let start = match self {
            Self::OneDay => end - Duration::days(1),
            Self::OneWeek => end - Duration::days(7),
            Self::OneMonth => months_back(end, 1),
            Self::OneYear => years_back(end, 1),
        };
        DateWindow { start, end }
    }
}

impl Display for HistoricalRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoricalRange {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1d" => Ok(Self::OneDay),
            "1w" => Ok(Self::OneWeek),
            "1m" => Ok(Self::OneMonth),
            "1y" => Ok(Self::OneYear),
            other => Err(ValidationError::InvalidRange {
                value: other.to_owned(),
            }),
        }
    }
}

/// Inclusive `[start, end]` calendar window sent to the historical endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: Date,
    pub end: Date,
}

impl DateWindow {
    pub fn start_param(&self) -> String {
        format_iso_date(self.start)
    }

    pub fn end_param(&self) -> String {
        format_iso_date(self.end)
    }
}

pub(crate) fn format_iso_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

fn months_back(date: Date, months: u8) -> Date {
    let mut year = date.year();
    let mut month = date.month();
    for _ in 0..months {
        if month == Month::January {
            year -= 1;
        }
        month = month.previous();
    }
    clamped_date(year, month, date.day())
}

fn years_back(date: Date, years: i32) -> Date {
    clamped_date(date.year() - years, date.month(), date.day())
}

fn clamped_date(year: i32, month: Month, day: u8) -> Date {
    let mut day = day;
    loop {
        match Date::from_calendar_date(year, month, day) {
            Ok(date) => return date,
            Err(_) if day > 28 => day -= 1,
            Err(_) => return Date::MIN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(input: &str) -> UtcDateTime {
        UtcDateTime::parse(input).expect("timestamp")
    }

    #[test]
    fn computes_each_range_from_now() {
        let now = at("2024-06-15T12:00:00Z");
        let expected = [
            (HistoricalRange::OneDay, "2024-06-14"),
            (HistoricalRange::OneWeek, "2024-06-08"),
            (HistoricalRange::OneMonth, "2024-05-15"),
            (HistoricalRange::OneYear, "2023-06-15"),
        ];
        for (range, start) in expected {
            let window = range.window_ending_at(now);
            assert_eq!(window.start_param(), start, "range {range}");
            assert_eq!(window.end_param(), "2024-06-15");
        }
    }

    #[test]
    fn month_and_year_steps_clamp_to_month_end() {
        let window = HistoricalRange::OneMonth.window_ending_at(at("2024-03-31T08:00:00Z"));
        assert_eq!(window.start_param(), "2024-02-29");

        let window = HistoricalRange::OneYear.window_ending_at(at("2024-02-29T08:00:00Z"));
        assert_eq!(window.start_param(), "2023-02-28");

        let window = HistoricalRange::OneMonth.window_ending_at(at("2024-01-10T08:00:00Z"));
        assert_eq!(window.start_param(), "2023-12-10");
    }

    #[test]
    fn parses_range_selector() {
        assert_eq!(
            HistoricalRange::from_str("1W").expect("must parse"),
            HistoricalRange::OneWeek
        );
        assert!(matches!(
            HistoricalRange::from_str("5y"),
            Err(ValidationError::InvalidRange { .. })
        ));
    }
}
