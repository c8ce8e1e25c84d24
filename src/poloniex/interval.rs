//! Candle granularities
//!
//! The markets API names its candle intervals (`MINUTE_1` ... `MONTH_1`); the
//! legacy chart endpoint takes a period in seconds from a short fixed list.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{ApiError, ParameterKind};

const DAY: u64 = 86_400;

/// Candle interval accepted by `/markets/{symbol}/candles`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "MINUTE_1")]
    Minute1,
    #[serde(rename = "MINUTE_5")]
    Minute5,
    #[serde(rename = "MINUTE_10")]
    Minute10,
    #[serde(rename = "MINUTE_15")]
    Minute15,
    #[serde(rename = "MINUTE_30")]
    Minute30,
    #[serde(rename = "HOUR_1")]
    Hour1,
    #[serde(rename = "HOUR_2")]
    Hour2,
    #[serde(rename = "HOUR_4")]
    Hour4,
    #[serde(rename = "HOUR_6")]
    Hour6,
    #[serde(rename = "HOUR_12")]
    Hour12,
    #[serde(rename = "DAY_1")]
    Day1,
    #[serde(rename = "DAY_3")]
    Day3,
    #[serde(rename = "WEEK_1")]
    Week1,
    #[serde(rename = "MONTH_1")]
    Month1,
}

impl Interval {
    pub const ALL: [Interval; 14] = [
        Interval::Minute1,
        Interval::Minute5,
        Interval::Minute10,
        Interval::Minute15,
        Interval::Minute30,
        Interval::Hour1,
        Interval::Hour2,
        Interval::Hour4,
        Interval::Hour6,
        Interval::Hour12,
        Interval::Day1,
        Interval::Day3,
        Interval::Week1,
        Interval::Month1,
    ];

    /// Wire name, e.g. `HOUR_4`
    pub fn name(&self) -> &'static str {
        match self {
            Interval::Minute1 => "MINUTE_1",
            Interval::Minute5 => "MINUTE_5",
            Interval::Minute10 => "MINUTE_10",
            Interval::Minute15 => "MINUTE_15",
            Interval::Minute30 => "MINUTE_30",
            Interval::Hour1 => "HOUR_1",
            Interval::Hour2 => "HOUR_2",
            Interval::Hour4 => "HOUR_4",
            Interval::Hour6 => "HOUR_6",
            Interval::Hour12 => "HOUR_12",
            Interval::Day1 => "DAY_1",
            Interval::Day3 => "DAY_3",
            Interval::Week1 => "WEEK_1",
            Interval::Month1 => "MONTH_1",
        }
    }

    /// Duration in seconds (a month counts as 30 days)
    pub fn seconds(&self) -> u64 {
        match self {
            Interval::Minute1 => 60,
            Interval::Minute5 => 300,
            Interval::Minute10 => 600,
            Interval::Minute15 => 900,
            Interval::Minute30 => 1800,
            Interval::Hour1 => 3600,
            Interval::Hour2 => 7200,
            Interval::Hour4 => 14_400,
            Interval::Hour6 => 21_600,
            Interval::Hour12 => 43_200,
            Interval::Day1 => DAY,
            Interval::Day3 => 3 * DAY,
            Interval::Week1 => 7 * DAY,
            Interval::Month1 => 30 * DAY,
        }
    }

    /// Look an interval up by wire name
    pub fn from_name(name: &str) -> Result<Self, ApiError> {
        Self::ALL
            .into_iter()
            .find(|interval| interval.name() == name)
            .ok_or_else(|| ApiError::invalid(ParameterKind::BadPeriod, "interval", name))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Interval {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// Candle period accepted by the legacy `returnChartData` command, in seconds
pub const CHART_PERIODS: [u32; 6] = [300, 900, 1800, 7200, 14_400, 86_400];

pub fn is_valid_chart_period(period: u32) -> bool {
    CHART_PERIODS.contains(&period)
}
