use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::UtcOffset;

use crate::{UtcDateTime, ValidationError};

const DATE_TIME: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const DATE_ONLY: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Cadence of the data a label is produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Snapshot,
    Tick,
    DailyBar,
}

/// Renders axis labels in a fixed display offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelFormatter {
    offset: UtcOffset,
}

impl Default for LabelFormatter {
    fn default() -> Self {
        Self::new(UtcOffset::UTC)
    }
}

impl LabelFormatter {
    pub const fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }

    /// Snapshot and tick labels are local date-times; daily bars use the
    /// ISO calendar date of the bar in UTC.
    pub fn label(&self, cadence: Cadence, timestamp: UtcDateTime) -> String {
        let value = timestamp.into_inner();
        let formatted = match cadence {
            Cadence::Snapshot | Cadence::Tick => value.to_offset(self.offset).format(DATE_TIME),
            Cadence::DailyBar => value.format(DATE_ONLY),
        };
        formatted.unwrap_or_else(|_| timestamp.format_rfc3339())
    }
}

/// Parse a display offset such as `+05:30`, `-04:00` or `Z`.
pub fn parse_utc_offset(input: &str) -> Result<UtcOffset, ValidationError> {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return Ok(UtcOffset::UTC);
    }
    UtcOffset::parse(
        trimmed,
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
    .map_err(|_| ValidationError::InvalidUtcOffset {
        value: input.to_owned(),
    })
}
