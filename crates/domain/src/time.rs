//! Times-of-day and circular clock arithmetic.
//!
//! The device tracks no date, only `HH:MM:SS` wall-clock times. Two values
//! can therefore only be compared as a signed shortest distance around the
//! 24 h clock face, never as absolute instants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FormatError;

/// Seconds in twelve hours.
const HALF_DAY_SECS: i32 = 43_200;
/// Seconds in a full day.
const DAY_SECS: i32 = 86_400;

/// A time-of-day triple with no date component.
///
/// Invariant: `hour` ∈ 0..=23, `minute` and `second` ∈ 0..=59. The canonical
/// string form is zero-padded `HH:MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
    second: u8,
}

impl TimeOfDay {
    /// Midnight, used as the zero placeholder for empty-string comparisons.
    pub const ZERO: Self = Self {
        hour: 0,
        minute: 0,
        second: 0,
    };

    /// Build a time-of-day from components.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::OutOfRange`] when any component exceeds its
    /// bound.
    pub fn new(hour: u8, minute: u8, second: u8) -> Result<Self, FormatError> {
        if hour > 23 || minute > 59 || second > 59 {
            return Err(FormatError::OutOfRange(format!(
                "{hour:02}:{minute:02}:{second:02}"
            )));
        }
        Ok(Self {
            hour,
            minute,
            second,
        })
    }

    /// Parse the device's canonical `HH:MM:SS` form.
    ///
    /// The empty string parses to [`TimeOfDay::ZERO`] — it is the
    /// placeholder the control loop compares against when the device has
    /// never reported a time.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] for anything else that is not a well-formed,
    /// in-range `HH:MM:SS` string.
    pub fn parse(input: &str) -> Result<Self, FormatError> {
        if input.is_empty() {
            return Ok(Self::ZERO);
        }
        let (hour, minute, second) =
            split_hms(input).ok_or_else(|| FormatError::Syntax(input.to_string()))?;
        Self::new(hour, minute, second).map_err(|_| FormatError::OutOfRange(input.to_string()))
    }

    #[must_use]
    pub fn hour(self) -> u8 {
        self.hour
    }

    #[must_use]
    pub fn minute(self) -> u8 {
        self.minute
    }

    #[must_use]
    pub fn second(self) -> u8 {
        self.second
    }

    /// Seconds since midnight, in `0..86400`.
    #[must_use]
    pub fn seconds_of_day(self) -> u32 {
        u32::from(self.second) + 60 * (u32::from(self.minute) + 60 * u32::from(self.hour))
    }

    /// Truncated `HH:MM` form used when propagating a closing time to the
    /// external status service.
    #[must_use]
    pub fn hhmm(self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

impl FromStr for TimeOfDay {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Signed shortest circular distance `to − from`, in seconds.
///
/// Chooses the closest direction around the 24 h clock face, so the result
/// stays within ±12 h even when the raw difference crosses midnight:
/// `23:59 → 00:01` is +2 minutes, not −23 h 58 m.
#[must_use]
pub fn offset_seconds(from: TimeOfDay, to: TimeOfDay) -> i32 {
    let mut diff = to.seconds_of_day() as i32 - from.seconds_of_day() as i32;
    if diff > HALF_DAY_SECS {
        diff -= DAY_SECS;
    } else if diff < -HALF_DAY_SECS {
        diff += DAY_SECS;
    }
    diff
}

/// Total predicate for the device's time format: length 8, colons at
/// positions 2 and 5, and the six remaining characters a valid in-range
/// `HH:MM:SS`. Used both for validating admin input and for classifying
/// bare time replies on the serial line.
#[must_use]
pub fn is_time_string(input: &str) -> bool {
    split_hms(input).is_some_and(|(h, m, s)| h <= 23 && m <= 59 && s <= 59)
}

/// Split `HH:MM:SS` into numeric components without range checking.
/// Returns `None` when the shape (length, colons, digits) is wrong.
fn split_hms(input: &str) -> Option<(u8, u8, u8)> {
    let bytes = input.as_bytes();
    if bytes.len() != 8 || bytes[2] != b':' || bytes[5] != b':' {
        return None;
    }
    let pair = |hi: u8, lo: u8| -> Option<u8> {
        if hi.is_ascii_digit() && lo.is_ascii_digit() {
            Some((hi - b'0') * 10 + (lo - b'0'))
        } else {
            None
        }
    };
    Some((
        pair(bytes[0], bytes[1])?,
        pair(bytes[3], bytes[4])?,
        pair(bytes[6], bytes[7])?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u8, m: u8, s: u8) -> TimeOfDay {
        TimeOfDay::new(h, m, s).unwrap()
    }

    #[test]
    fn should_round_trip_valid_time_strings() {
        for input in ["00:00:00", "04:23:11", "12:00:59", "23:59:59"] {
            let parsed = TimeOfDay::parse(input).unwrap();
            assert_eq!(parsed.to_string(), input);
        }
    }

    #[test]
    fn should_parse_empty_string_as_zero_time() {
        assert_eq!(TimeOfDay::parse("").unwrap(), TimeOfDay::ZERO);
    }

    #[test]
    fn should_reject_out_of_range_components() {
        assert_eq!(
            TimeOfDay::parse("24:00:00"),
            Err(FormatError::OutOfRange("24:00:00".to_string()))
        );
        assert!(TimeOfDay::parse("12:60:00").is_err());
        assert!(TimeOfDay::parse("12:00:60").is_err());
        assert!(TimeOfDay::new(24, 0, 0).is_err());
    }

    #[test]
    fn should_reject_malformed_syntax() {
        for input in ["4:23:11", "04-23-11", "04:23", "04:23:11:00", "ab:cd:ef"] {
            assert!(
                matches!(TimeOfDay::parse(input), Err(FormatError::Syntax(_))),
                "{input:?} should be a syntax error"
            );
        }
    }

    #[test]
    fn should_compute_seconds_of_day() {
        assert_eq!(t(0, 0, 0).seconds_of_day(), 0);
        assert_eq!(t(1, 2, 3).seconds_of_day(), 3723);
        assert_eq!(t(23, 59, 59).seconds_of_day(), 86_399);
    }

    #[test]
    fn should_truncate_to_hhmm() {
        assert_eq!(t(15, 30, 45).hhmm(), "15:30");
    }

    #[test]
    fn should_report_zero_offset_for_identical_times() {
        for time in [t(0, 0, 0), t(12, 0, 0), t(23, 59, 59)] {
            assert_eq!(offset_seconds(time, time), 0);
        }
    }

    #[test]
    fn should_be_antisymmetric() {
        let pairs = [
            (t(4, 10, 0), t(4, 10, 15)),
            (t(23, 59, 0), t(0, 1, 0)),
            (t(6, 0, 0), t(18, 0, 0)),
            (t(1, 2, 3), t(20, 30, 40)),
        ];
        for (a, b) in pairs {
            assert_eq!(offset_seconds(a, b), -offset_seconds(b, a));
        }
    }

    #[test]
    fn should_take_the_short_way_around_midnight() {
        assert_eq!(offset_seconds(t(23, 59, 0), t(0, 1, 0)), 120);
        assert_eq!(offset_seconds(t(0, 1, 0), t(23, 59, 0)), -120);
    }

    #[test]
    fn should_stay_within_half_a_day() {
        let times = [
            t(0, 0, 0),
            t(3, 33, 33),
            t(11, 59, 59),
            t(12, 0, 1),
            t(18, 45, 0),
            t(23, 59, 59),
        ];
        for a in times {
            for b in times {
                let off = offset_seconds(a, b);
                assert!(
                    off > -HALF_DAY_SECS && off <= HALF_DAY_SECS,
                    "offset({a}, {b}) = {off} out of range"
                );
            }
        }
    }

    #[test]
    fn should_accept_valid_time_strings() {
        for input in ["00:00:00", "09:59:59", "19:00:01", "23:00:00"] {
            assert!(is_time_string(input), "{input:?} should be accepted");
        }
    }

    #[test]
    fn should_reject_invalid_time_strings() {
        let cases = [
            "",            // empty
            "04:23:1",     // wrong length
            "04:23:115",   // wrong length
            "04.23.11",    // missing colons
            "0423:11:",    // misplaced colons
            "4:23:11",     // single-digit hour (wrong length too)
            "24:00:00",    // hour out of range
            "12:60:00",    // minute out of range
            "12:00:60",    // second out of range
            "1a:00:00",    // non-digit
            "12:00:0x",    // non-digit
        ];
        for input in cases {
            assert!(!is_time_string(input), "{input:?} should be rejected");
        }
    }
}
