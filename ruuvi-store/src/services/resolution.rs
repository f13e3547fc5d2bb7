use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Upper bound on points returned per device when no resolution is
/// requested. Overridable through the `query.point_budget` setting.
pub const DEFAULT_POINT_BUDGET: usize = 500;

/// Bucket widths a query may aggregate into, coarsest last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Raw,
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    OneHour,
    SixHours,
    OneDay,
}

/// Every resolution in ascending bucket-width order.
pub const LADDER: [Resolution; 7] = [
    Resolution::Raw,
    Resolution::OneMinute,
    Resolution::FiveMinutes,
    Resolution::FifteenMinutes,
    Resolution::OneHour,
    Resolution::SixHours,
    Resolution::OneDay,
];

impl Resolution {
    /// Bucket width in seconds, `None` for raw samples.
    pub fn bucket_seconds(&self) -> Option<i64> {
        match self {
            Resolution::Raw => None,
            Resolution::OneMinute => Some(60),
            Resolution::FiveMinutes => Some(300),
            Resolution::FifteenMinutes => Some(900),
            Resolution::OneHour => Some(3_600),
            Resolution::SixHours => Some(21_600),
            Resolution::OneDay => Some(86_400),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Raw => "raw",
            Resolution::OneMinute => "1m",
            Resolution::FiveMinutes => "5m",
            Resolution::FifteenMinutes => "15m",
            Resolution::OneHour => "1h",
            Resolution::SixHours => "6h",
            Resolution::OneDay => "1d",
        }
    }

    /// Worst-case points a span of `span_seconds` yields at this
    /// resolution. Raw data is assumed to arrive at one sample per
    /// second, the densest rate the tags broadcast at.
    fn max_points(&self, span_seconds: i64) -> i64 {
        match self.bucket_seconds() {
            None => span_seconds + 1,
            Some(width) => span_seconds / width + 1,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(Resolution::Raw),
            "1m" => Ok(Resolution::OneMinute),
            "5m" => Ok(Resolution::FiveMinutes),
            "15m" => Ok(Resolution::FifteenMinutes),
            "1h" => Ok(Resolution::OneHour),
            "6h" => Ok(Resolution::SixHours),
            "1d" => Ok(Resolution::OneDay),
            other => Err(format!("unknown resolution: {other}")),
        }
    }
}

/// Pick the resolution for a query. An explicit request always wins.
/// Otherwise walk the ladder from finest to coarsest and take the
/// first step whose worst-case point count fits the budget; a span
/// too long even for daily buckets still gets daily buckets.
pub fn select(
    start: i64,
    end: i64,
    requested: Option<Resolution>,
    point_budget: usize,
) -> Resolution {
    if let Some(resolution) = requested {
        return resolution;
    }

    let span = end.saturating_sub(start).max(0);
    for resolution in LADDER {
        if resolution.max_points(span) <= point_budget as i64 {
            return resolution;
        }
    }

    Resolution::OneDay
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_request_wins() {
        // A month of data at raw resolution, because the caller said so.
        let r = select(0, 30 * 86_400, Some(Resolution::Raw), DEFAULT_POINT_BUDGET);
        assert_eq!(r, Resolution::Raw);
    }

    #[test]
    fn test_short_span_stays_raw() {
        assert_eq!(select(0, 400, None, DEFAULT_POINT_BUDGET), Resolution::Raw);
    }

    #[test]
    fn test_ladder_walks_up_with_span() {
        assert_eq!(select(0, 10_000, None, DEFAULT_POINT_BUDGET), Resolution::OneMinute);
        assert_eq!(select(0, 100_000, None, DEFAULT_POINT_BUDGET), Resolution::FiveMinutes);
        // 30 days of hourly buckets is 721 points, one step short.
        assert_eq!(
            select(0, 30 * 86_400, None, DEFAULT_POINT_BUDGET),
            Resolution::SixHours
        );
        assert_eq!(
            select(0, 10 * 86_400, None, DEFAULT_POINT_BUDGET),
            Resolution::OneHour
        );
    }

    #[test]
    fn test_huge_span_caps_at_one_day() {
        let ten_years = 10 * 365 * 86_400;
        assert_eq!(select(0, ten_years, None, DEFAULT_POINT_BUDGET), Resolution::OneDay);
    }

    #[test]
    fn test_parse_round_trip() {
        for resolution in LADDER {
            assert_eq!(resolution.as_str().parse::<Resolution>(), Ok(resolution));
        }
        assert!("2h".parse::<Resolution>().is_err());
    }
}
