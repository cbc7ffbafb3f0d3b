//! Time-left arithmetic and rendering.
//!
//! The split mirrors what the host page has always shown:
//! ```text
//! delta   = target - now                        (ms, may be negative)
//! hours   = max(0, floor(delta / 3_600_000))
//! minutes = max(0, floor((delta % 3_600_000) / 60_000))
//! seconds = max(0, floor((delta % 60_000) / 1_000))
//! ```
//! `%` is the truncating remainder, so every unit of a past target clamps to 0.
//! A missing target behaves like NaN: all units are 0.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::TargetError;

const SECOND_MS: i64 = 1_000;
const MINUTE_MS: i64 = 60 * SECOND_MS;
const HOUR_MS: i64 = 60 * MINUTE_MS;

/// Naive layouts accepted for targets without an offset (read as UTC).
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// How minutes and seconds are rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Padding {
    /// `H:M:S` (e.g. `1:5:7`), as the host page renders it.
    #[default]
    Unpadded,
    /// `H:MM:SS` (e.g. `1:05:07`). Hours are never padded.
    MinutesSeconds,
}

/// Clamped time left until a target.
///
/// Ordering is lexicographic over `(hours, minutes, seconds)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Remaining {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Remaining {
    /// Nothing left.
    pub const ZERO: Remaining = Remaining {
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Time left from `now` until `target`; `None` target yields [`Remaining::ZERO`].
    pub fn until(target: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        match target {
            Some(target) => Self::from_millis((target - now).num_milliseconds()),
            None => Self::ZERO,
        }
    }

    /// Splits a signed millisecond delta, clamping each unit at 0.
    pub fn from_millis(delta: i64) -> Self {
        let clamp = |v: i64| u64::try_from(v).unwrap_or(0);
        Self {
            hours: clamp(delta.div_euclid(HOUR_MS)),
            minutes: clamp((delta % HOUR_MS).div_euclid(MINUTE_MS)),
            seconds: clamp((delta % MINUTE_MS).div_euclid(SECOND_MS)),
        }
    }

    /// True once every unit is 0.
    #[inline]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Renders `hours:minutes:seconds` with the given padding.
    pub fn render(&self, padding: Padding) -> String {
        match padding {
            Padding::Unpadded => format!("{}:{}:{}", self.hours, self.minutes, self.seconds),
            Padding::MinutesSeconds => {
                format!("{}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
            }
        }
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(Padding::Unpadded))
    }
}

/// Parses a target date attribute.
///
/// Accepted, in order: RFC 3339, RFC 2822, naive date-times (UTC), a bare
/// `YYYY-MM-DD` (UTC midnight), and integer epoch milliseconds.
pub fn parse_target(raw: &str) -> Result<DateTime<Utc>, TargetError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(TargetError::Empty);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(naive.and_utc());
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }
    if let Some(dt) = raw
        .parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
    {
        return Ok(dt);
    }

    Err(TargetError::Unparseable {
        raw: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(secs, 0).expect("valid timestamp")
    }

    #[test]
    fn test_split_of_future_delta() {
        let r = Remaining::from_millis(2 * HOUR_MS + 5 * MINUTE_MS + 7 * SECOND_MS + 999);
        assert_eq!(
            r,
            Remaining {
                hours: 2,
                minutes: 5,
                seconds: 7
            }
        );
        assert_eq!(r.render(Padding::Unpadded), "2:5:7");
        assert_eq!(r.render(Padding::MinutesSeconds), "2:05:07");
    }

    #[test]
    fn test_hours_are_not_capped_at_a_day() {
        let r = Remaining::from_millis(50 * HOUR_MS);
        assert_eq!(r.hours, 50);
        assert_eq!(r.render(Padding::MinutesSeconds), "50:00:00");
    }

    #[test]
    fn test_past_target_clamps_every_unit() {
        for delta in [-1, -500, -SECOND_MS, -MINUTE_MS - 1, -3 * HOUR_MS - 7] {
            assert_eq!(Remaining::from_millis(delta), Remaining::ZERO, "delta={delta}");
        }
        assert!(Remaining::until(Some(at(100)), at(200)).is_zero());
    }

    #[test]
    fn test_sub_second_remainder_floors_to_zero() {
        assert!(Remaining::from_millis(999).is_zero());
        assert_eq!(Remaining::from_millis(1_000).seconds, 1);
    }

    #[test]
    fn test_missing_target_is_zero() {
        assert!(Remaining::until(None, at(0)).is_zero());
    }

    #[test]
    fn test_until_uses_clock_delta() {
        let now = at(1_000);
        let target = now + TimeDelta::seconds(3_725);
        assert_eq!(
            Remaining::until(Some(target), now),
            Remaining {
                hours: 1,
                minutes: 2,
                seconds: 5
            }
        );
    }

    #[test]
    fn test_parse_accepted_layouts() {
        let expected = at(1_700_000_000);
        for raw in [
            "2023-11-14T22:13:20Z",
            "2023-11-15T06:13:20+08:00",
            "Tue, 14 Nov 2023 22:13:20 +0000",
            "2023-11-14 22:13:20",
            "2023-11-14T22:13:20",
            "2023-11-14 22:13:20.000",
            "1700000000000",
            "  2023-11-14T22:13:20Z  ",
        ] {
            assert_eq!(parse_target(raw), Ok(expected), "raw={raw:?}");
        }
        assert_eq!(parse_target("1970-01-02"), Ok(at(86_400)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_target(""), Err(TargetError::Empty));
        assert_eq!(parse_target("   "), Err(TargetError::Empty));
        assert_eq!(
            parse_target("not a date").map_err(|e| e.as_label()),
            Err("target_unparseable")
        );
        assert!(parse_target("2023-13-45 99:99:99").is_err());
    }
}
