//! UTC date handling for query windows and trade timestamps
//!
//! Poloniex's legacy endpoints speak epoch seconds, the markets endpoints speak
//! epoch milliseconds, and humans speak `YYYY-MM-DD HH:MM:SS`. Everything here
//! is UTC; local time never enters the picture.

use chrono::{DateTime, NaiveDateTime, Utc};

use super::error::{ApiError, ApiResult, ParameterKind};

/// Human-readable timestamp format used by the API and accepted from callers
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A window boundary as supplied by the caller
///
/// Integer literals convert through `i64`, `i32` or `u32`; epoch milliseconds
/// overflow `i32`, so write them with an `i64` suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateInput {
    /// `YYYY-MM-DD HH:MM:SS`, interpreted as UTC
    Text(String),
    /// Already an epoch value in the unit the endpoint expects, passed through untouched
    Epoch(i64),
    /// A point in time, rendered in whichever unit the endpoint expects
    Instant(DateTime<Utc>),
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        DateInput::Text(value.to_string())
    }
}

impl From<String> for DateInput {
    fn from(value: String) -> Self {
        DateInput::Text(value)
    }
}

impl From<i64> for DateInput {
    fn from(value: i64) -> Self {
        DateInput::Epoch(value)
    }
}

impl From<i32> for DateInput {
    fn from(value: i32) -> Self {
        DateInput::Epoch(value.into())
    }
}

impl From<u32> for DateInput {
    fn from(value: u32) -> Self {
        DateInput::Epoch(value.into())
    }
}

impl From<DateTime<Utc>> for DateInput {
    fn from(value: DateTime<Utc>) -> Self {
        DateInput::Instant(value)
    }
}

impl DateInput {
    /// Epoch seconds; numeric input is returned as is
    pub fn epoch_secs(&self) -> Result<i64, chrono::ParseError> {
        match self {
            DateInput::Text(text) => parse_utc(text).map(|dt| dt.and_utc().timestamp()),
            DateInput::Epoch(value) => Ok(*value),
            DateInput::Instant(dt) => Ok(dt.timestamp()),
        }
    }

    /// Epoch milliseconds; numeric input is returned as is
    pub fn epoch_millis(&self) -> Result<i64, chrono::ParseError> {
        match self {
            DateInput::Text(text) => {
                parse_utc(text).map(|dt| dt.and_utc().timestamp_millis())
            }
            DateInput::Epoch(value) => Ok(*value),
            DateInput::Instant(dt) => Ok(dt.timestamp_millis()),
        }
    }

    pub(crate) fn secs_for(&self, command: &str) -> ApiResult<i64> {
        self.epoch_secs().map_err(|_| self.rejected(command))
    }

    pub(crate) fn millis_for(&self, command: &str) -> ApiResult<i64> {
        self.epoch_millis().map_err(|_| self.rejected(command))
    }

    fn rejected(&self, command: &str) -> ApiError {
        let value = match self {
            DateInput::Text(text) => text.clone(),
            DateInput::Epoch(value) => value.to_string(),
            DateInput::Instant(dt) => dt.to_rfc3339(),
        };
        ApiError::invalid(ParameterKind::BadDate, command, value)
    }
}

fn parse_utc(text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text.trim(), DATE_FORMAT)
}

/// Convert a date string (or epoch seconds) to epoch seconds
pub fn parse_date(date: impl Into<DateInput>) -> ApiResult<i64> {
    date.into().secs_for("parse_date")
}

/// Convert a date string (or epoch milliseconds) to epoch milliseconds
pub fn parse_date_millis(date: impl Into<DateInput>) -> ApiResult<i64> {
    date.into().millis_for("parse_date_millis")
}

/// Render epoch seconds as `YYYY-MM-DD HH:MM:SS.ffffff` (UTC)
pub fn format_date(epoch_secs: i64) -> String {
    DateTime::from_timestamp(epoch_secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S%.6f").to_string())
        .unwrap_or_else(|| epoch_secs.to_string())
}

/// Serde adapter for `YYYY-MM-DD HH:MM:SS` fields
pub(crate) mod api_date {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::DATE_FORMAT;

    pub fn serialize<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&text, DATE_FORMAT).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_is_utc() {
        assert_eq!(parse_date("1970-01-01 00:00:00").unwrap(), 0);
        assert_eq!(parse_date("2021-01-01 00:00:00").unwrap(), 1_609_459_200);
    }

    #[test]
    fn test_parse_date_passes_epoch_through() {
        assert_eq!(parse_date(1_609_459_200i64).unwrap(), 1_609_459_200);
        assert_eq!(parse_date_millis(1_609_459_200_123i64).unwrap(), 1_609_459_200_123);
    }

    #[test]
    fn test_parse_date_millis_scales_strings() {
        assert_eq!(
            parse_date_millis("2021-01-01 00:00:00").unwrap(),
            1_609_459_200_000
        );
    }

    #[test]
    fn test_format_round_trips_at_second_precision() {
        for text in [
            "2021-01-01 00:00:00",
            "2019-02-28 23:59:59",
            "2020-02-29 12:30:45",
            "1999-12-31 23:59:59",
        ] {
            let formatted = format_date(parse_date(text).unwrap());
            assert_eq!(&formatted[..19], text);
            assert!(formatted.ends_with(".000000"));
        }
    }

    #[test]
    fn test_parse_then_format_then_parse_is_identity() {
        for epoch in [0i64, 1, 1_609_459_199, 1_700_000_000] {
            let formatted = format_date(epoch);
            assert_eq!(parse_date(&formatted[..19]).unwrap(), epoch);
        }
    }

    #[test]
    fn test_bad_date_is_invalid_parameter() {
        let err = parse_date("01/02/2021").unwrap_err();
        match err {
            ApiError::InvalidParameter { kind, value, .. } => {
                assert_eq!(kind, ParameterKind::BadDate);
                assert_eq!(value, "01/02/2021");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_datetime_input() {
        let dt = DateTime::from_timestamp(1_609_459_200, 0).unwrap();
        assert_eq!(parse_date(dt).unwrap(), 1_609_459_200);
        assert_eq!(parse_date_millis(dt).unwrap(), 1_609_459_200_000);
    }

    #[test]
    fn test_datetime_millis_keep_subsecond_part() {
        let dt = DateTime::from_timestamp_millis(1_609_459_200_250).unwrap();
        assert_eq!(parse_date_millis(dt).unwrap(), 1_609_459_200_250);
        assert_eq!(parse_date(dt).unwrap(), 1_609_459_200);
    }

    #[test]
    fn test_unsuffixed_seconds_literal() {
        assert_eq!(parse_date(1_609_459_200).unwrap(), 1_609_459_200);
        assert_eq!(parse_date(86_400u32).unwrap(), 86_400);
    }
}
