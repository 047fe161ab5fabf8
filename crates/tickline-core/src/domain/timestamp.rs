use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

use crate::ValidationError;

/// Wall-clock instant normalized to UTC.
///
/// Accepts the three shapes the market backend emits: RFC3339 strings with any
/// offset, bare `YYYY-MM-DD` dates (taken as midnight UTC) and epoch
/// milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTime(OffsetDateTime);

impl UtcDateTime {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
            return Ok(Self(parsed.to_offset(UtcOffset::UTC)));
        }

        let date = Date::parse(trimmed, format_description!("[year]-[month]-[day]")).map_err(
            |_| ValidationError::InvalidTimestamp {
                value: input.to_owned(),
            },
        )?;
        Ok(Self(date.midnight().assume_utc()))
    }

    pub fn from_unix_millis(millis: i64) -> Result<Self, ValidationError> {
        let nanos = i128::from(millis) * 1_000_000;
        OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .map(Self)
            .map_err(|_| ValidationError::InvalidTimestamp {
                value: millis.to_string(),
            })
    }

    pub fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    pub fn date(self) -> Date {
        self.0.date()
    }

    pub fn unix_millis(self) -> i64 {
        (self.0.unix_timestamp_nanos() / 1_000_000) as i64
    }

    pub fn format_rfc3339(self) -> String {
        self.0
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.unix_millis().to_string())
    }
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_rfc3339())
    }
}

impl Serialize for UtcDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_rfc3339())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireTimestamp {
    Millis(i64),
    FractionalMillis(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for UtcDateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match WireTimestamp::deserialize(deserializer)? {
            WireTimestamp::Millis(millis) => Self::from_unix_millis(millis),
            WireTimestamp::FractionalMillis(millis) if millis.is_finite() => {
                Self::from_unix_millis(millis.trunc() as i64)
            }
            WireTimestamp::FractionalMillis(millis) => Err(ValidationError::InvalidTimestamp {
                value: millis.to_string(),
            }),
            WireTimestamp::Text(text) => Self::parse(&text),
        }
        .map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_offset_timestamps_to_utc() {
        let parsed = UtcDateTime::parse("2024-03-01T15:30:00+05:30").expect("must parse");
        assert_eq!(parsed.format_rfc3339(), "2024-03-01T10:00:00Z");
    }

    #[test]
    fn parses_bare_dates_as_midnight() {
        let parsed = UtcDateTime::parse("2024-03-01").expect("must parse");
        assert_eq!(parsed.format_rfc3339(), "2024-03-01T00:00:00Z");
    }

    #[test]
    fn deserializes_epoch_millis_and_strings() {
        let from_number: UtcDateTime =
            serde_json::from_str("1704067200000").expect("millis should parse");
        let from_text: UtcDateTime =
            serde_json::from_str("\"2024-01-01T00:00:00.000Z\"").expect("text should parse");
        assert_eq!(from_number, from_text);
    }

    #[test]
    fn rejects_garbage() {
        let err = UtcDateTime::parse("yesterday").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidTimestamp { .. }));
    }
}
