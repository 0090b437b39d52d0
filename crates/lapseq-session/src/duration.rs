//! Duration-typed lap cells
//!
//! Timing columns arrive from the exporter either as plain numbers (seconds) or as
//! textual durations in the format pandas writes timedeltas:
//!
//! ```text
//! 0 days 00:01:32.123000
//! 00:01:32.123
//! 1:32.123
//! 92.123
//! ```
//!
//! [`TimeCell`] keeps whichever form was read. Cleaning converts every textual cell
//! to seconds with [`TimeCell::to_seconds`]; a column that fails to convert keeps
//! its textual cells.
//!
//! # Examples
//!
//! ```
//! use lapseq_session::duration::{TimeCell, parse_duration};
//!
//! let delta = parse_duration("0 days 00:01:32.500000").unwrap();
//! assert_eq!(delta.num_milliseconds(), 92_500);
//!
//! let cell = TimeCell::Text("00:01:30".to_owned());
//! assert_eq!(cell.to_seconds().unwrap(), 90.0);
//! assert_eq!(cell.seconds(), None);
//! ```

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum DurationParseError {
    #[display("empty duration text")]
    Empty,
    #[display("invalid duration text '{text}'")]
    Invalid { text: String },
    #[display("duration '{text}' is out of range")]
    OutOfRange { text: String },
}

/// A single timing cell of a lap row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeCell {
    /// Numeric seconds
    Seconds(f64),
    /// Textual duration that has not been converted yet
    Text(String),
}

impl TimeCell {
    /// Zero duration, used for synthesized laps.
    pub const ZERO: Self = Self::Seconds(0.0);

    /// Returns the value in seconds if the cell is already numeric.
    #[must_use]
    pub fn seconds(&self) -> Option<f64> {
        match self {
            Self::Seconds(seconds) => Some(*seconds),
            Self::Text(_) => None,
        }
    }

    /// Converts the cell to seconds, parsing textual durations.
    pub fn to_seconds(&self) -> Result<f64, DurationParseError> {
        match self {
            Self::Seconds(seconds) => Ok(*seconds),
            Self::Text(text) => parse_duration(text).map(|delta| delta_seconds(&delta)),
        }
    }
}

/// Total seconds of a [`TimeDelta`], including the fractional part.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn delta_seconds(delta: &TimeDelta) -> f64 {
    delta.num_seconds() as f64 + f64::from(delta.subsec_nanos()) / 1e9
}

/// Parses a textual duration.
///
/// Accepts an optional `"<n> days "` prefix followed by `[[HH:]MM:]SS[.fraction]`.
/// The fraction may have any number of digits; digits beyond nanosecond precision
/// are ignored.
pub fn parse_duration(text: &str) -> Result<TimeDelta, DurationParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DurationParseError::Empty);
    }
    let invalid = || DurationParseError::Invalid {
        text: text.to_owned(),
    };
    let out_of_range = || DurationParseError::OutOfRange {
        text: text.to_owned(),
    };

    let (days, clock) = match trimmed
        .split_once(" days")
        .or_else(|| trimmed.split_once(" day"))
    {
        Some((days, rest)) => {
            let days = days.trim().parse::<i64>().map_err(|_| invalid())?;
            // negative durations print as "-1 days +23:59:59.5"
            let rest = rest.trim();
            (days, rest.strip_prefix('+').unwrap_or(rest))
        }
        None => (0, trimmed),
    };
    if clock.is_empty() {
        return TimeDelta::try_days(days).ok_or_else(out_of_range);
    }

    // seconds, minutes, hours (right to left)
    let mut parts = clock.rsplitn(3, ':');
    let seconds_part = parts.next().ok_or_else(invalid)?;
    let minutes = match parts.next() {
        Some(part) => parse_unsigned(part).ok_or_else(invalid)?,
        None => 0,
    };
    let hours = match parts.next() {
        Some(part) => parse_unsigned(part).ok_or_else(invalid)?,
        None => 0,
    };

    let (whole, fraction) = seconds_part
        .split_once('.')
        .unwrap_or((seconds_part, ""));
    let whole = parse_unsigned(whole).ok_or_else(invalid)?;
    if !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let nanos = fraction
        .chars()
        .chain(std::iter::repeat('0'))
        .take(9)
        .collect::<String>()
        .parse::<i64>()
        .map_err(|_| invalid())?;

    let total = [
        TimeDelta::try_days(days),
        TimeDelta::try_hours(hours),
        TimeDelta::try_minutes(minutes),
        TimeDelta::try_seconds(whole),
        Some(TimeDelta::nanoseconds(nanos)),
    ]
    .into_iter()
    .try_fold(TimeDelta::zero(), |acc, part| acc.checked_add(&part?));
    total.ok_or_else(out_of_range)
}

fn parse_unsigned(text: &str) -> Option<i64> {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pandas_timedelta_format() {
        let delta = parse_duration("0 days 00:01:32.123000").unwrap();
        assert_eq!(delta.num_milliseconds(), 92_123);

        let delta = parse_duration("1 days 02:00:00").unwrap();
        assert_eq!(delta.num_hours(), 26);

        let delta = parse_duration("-1 days +23:59:59.500000").unwrap();
        assert_eq!(delta.num_milliseconds(), -500);
        assert!(parse_duration("+00:00:01").is_err());
    }

    #[test]
    fn test_short_forms() {
        assert_eq!(parse_duration("1:30").unwrap().num_seconds(), 90);
        assert_eq!(parse_duration("92.5").unwrap().num_milliseconds(), 92_500);
        assert_eq!(parse_duration(" 00:00:07 ").unwrap().num_seconds(), 7);
    }

    #[test]
    fn test_long_fraction_is_truncated_to_nanos() {
        let delta = parse_duration("0.1234567891").unwrap();
        assert_eq!(delta.subsec_nanos(), 123_456_789);
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(parse_duration("  "), Err(DurationParseError::Empty));
        assert!(matches!(
            parse_duration("fast"),
            Err(DurationParseError::Invalid { .. })
        ));
        assert!(matches!(
            parse_duration("00:-1:00"),
            Err(DurationParseError::Invalid { .. })
        ));
        assert!(matches!(
            parse_duration("1.2e3"),
            Err(DurationParseError::Invalid { .. })
        ));
        assert!(matches!(
            parse_duration("x days 00:00:01"),
            Err(DurationParseError::Invalid { .. })
        ));
    }

    #[test]
    fn test_cell_conversion() {
        assert_eq!(TimeCell::ZERO.to_seconds(), Ok(0.0));
        assert_eq!(TimeCell::Seconds(81.25).seconds(), Some(81.25));

        let cell = TimeCell::Text("0 days 00:01:21.250000".to_owned());
        assert_eq!(cell.seconds(), None);
        assert!((cell.to_seconds().unwrap() - 81.25).abs() < 1e-9);
    }

    #[test]
    fn test_cell_deserializes_number_or_text() {
        let cells: Vec<TimeCell> = serde_json::from_str(r#"[81.5, "00:01:21.5"]"#).unwrap();
        assert_eq!(cells[0], TimeCell::Seconds(81.5));
        assert_eq!(cells[1], TimeCell::Text("00:01:21.5".to_owned()));
    }
}
