//! ISO 8601 calendar durations.
//!
//! A [`Duration`] is seven independent, non-negative counters split into a
//! date component (years, months, weeks, days) and a time component (hours,
//! minutes, seconds). The two components are applied with different
//! semantics by [`crate::shift`]: the date component moves the wall clock on
//! the calendar, the time component adds an exact number of seconds.
//!
//! # Grammar
//!
//! ```text
//! P (<n>Y)? (<n>M)? (<n>W)? (<n>D)? ( T (<n>H)? (<n>M)? (<n>S)? )?
//! ```
//!
//! Designators are uppercase and must appear in this order, each at most
//! once. Every `<n>` is a run of ASCII digits that fits in an `i32`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::error::{DatespanError, Result};

/// Date-section designators in grammar order.
const DATE_DESIGNATORS: [(u8, &str); 4] =
    [(b'Y', "year"), (b'M', "month"), (b'W', "week"), (b'D', "day")];

/// Time-section designators in grammar order (after `T`).
const TIME_DESIGNATORS: [(u8, &str); 3] = [(b'H', "hour"), (b'M', "minute"), (b'S', "second")];

/// A calendar-style duration such as `P1Y2M` or `PT90M`.
///
/// Values are plain data: build one with [`parse_duration`], the single-field
/// constructors, or a struct literal.
///
/// # Examples
///
/// ```
/// use datespan::Duration;
///
/// let d: Duration = "P1Y2MT3H".parse().unwrap();
/// assert_eq!(d, Duration { year: 1, month: 2, hour: 3, ..Duration::ZERO });
/// assert_eq!(d.to_string(), "P1Y2MT3H");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Duration {
    pub year: u32,
    pub month: u32,
    pub week: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl Duration {
    /// The zero duration; shifting by it is the identity.
    pub const ZERO: Duration = Duration {
        year: 0,
        month: 0,
        week: 0,
        day: 0,
        hour: 0,
        minute: 0,
        second: 0,
    };

    /// `PnY`: a duration of `year` years and nothing else.
    #[must_use]
    pub const fn years(year: u32) -> Self {
        Self { year, ..Self::ZERO }
    }

    /// `PnM`: a duration of `month` months and nothing else.
    #[must_use]
    pub const fn months(month: u32) -> Self {
        Self { month, ..Self::ZERO }
    }

    /// `PnW`: a duration of `week` weeks and nothing else.
    #[must_use]
    pub const fn weeks(week: u32) -> Self {
        Self { week, ..Self::ZERO }
    }

    /// `PnD`: a duration of `day` days and nothing else.
    #[must_use]
    pub const fn days(day: u32) -> Self {
        Self { day, ..Self::ZERO }
    }

    /// `PTnH`: a duration of `hour` hours and nothing else.
    #[must_use]
    pub const fn hours(hour: u32) -> Self {
        Self { hour, ..Self::ZERO }
    }

    /// `PTnM`: a duration of `minute` minutes and nothing else.
    #[must_use]
    pub const fn minutes(minute: u32) -> Self {
        Self { minute, ..Self::ZERO }
    }

    /// `PTnS`: a duration of `second` seconds and nothing else.
    #[must_use]
    pub const fn seconds(second: u32) -> Self {
        Self { second, ..Self::ZERO }
    }

    /// Whether the year, month, week and day fields are all zero.
    pub const fn is_date_zero(&self) -> bool {
        self.year == 0 && self.month == 0 && self.week == 0 && self.day == 0
    }

    /// Whether the hour, minute and second fields are all zero.
    pub const fn is_time_zero(&self) -> bool {
        self.hour == 0 && self.minute == 0 && self.second == 0
    }

    pub const fn is_zero(&self) -> bool {
        self.is_date_zero() && self.is_time_zero()
    }

    /// Weeks and days merged into a single day count.
    pub const fn total_days(&self) -> u64 {
        self.week as u64 * 7 + self.day as u64
    }

    /// Exact length of the time component in seconds.
    pub const fn time_seconds(&self) -> u64 {
        self.hour as u64 * 3600 + self.minute as u64 * 60 + self.second as u64
    }

    /// Apply this duration to `input`. See [`crate::shift::shift`].
    pub fn shift<Tz: TimeZone>(&self, input: DateTime<Tz>) -> DateTime<Tz> {
        crate::shift::shift(self, input)
    }
}

/// Parse an ISO 8601 duration string (e.g. `"P6Y1M7W2DT3H4M5S"`).
///
/// `"P"` and `"PT"` both parse to [`Duration::ZERO`].
///
/// # Errors
///
/// Returns [`DatespanError::MalformedDuration`] if the input does not match
/// the grammar in its entirety, or [`DatespanError::NumericOverflow`] if a
/// field value does not fit in an `i32`.
///
/// # Examples
///
/// ```
/// use datespan::parse_duration;
///
/// let d = parse_duration("P1W2DT12H").unwrap();
/// assert_eq!((d.week, d.day, d.hour), (1, 2, 12));
/// assert!(parse_duration("PT1S1H").is_err());
/// ```
pub fn parse_duration(input: &str) -> Result<Duration> {
    let malformed = || {
        debug!(input, "rejecting malformed duration");
        DatespanError::MalformedDuration(input.to_string())
    };

    let rest = input.strip_prefix('P').ok_or_else(malformed)?;
    let (date_section, time_section) = match rest.split_once('T') {
        Some((date, time)) => (date, time),
        None => (rest, ""),
    };

    let date = scan_section(date_section, &DATE_DESIGNATORS).ok_or_else(malformed)?;
    let time = scan_section(time_section, &TIME_DESIGNATORS).ok_or_else(malformed)?;

    Ok(Duration {
        year: field_value(date[0], DATE_DESIGNATORS[0].1)?,
        month: field_value(date[1], DATE_DESIGNATORS[1].1)?,
        week: field_value(date[2], DATE_DESIGNATORS[2].1)?,
        day: field_value(date[3], DATE_DESIGNATORS[3].1)?,
        hour: field_value(time[0], TIME_DESIGNATORS[0].1)?,
        minute: field_value(time[1], TIME_DESIGNATORS[1].1)?,
        second: field_value(time[2], TIME_DESIGNATORS[2].1)?,
    })
}

/// Split one section into its digit groups, indexed like `designators`.
///
/// Each designator may only follow the ones before it in the table, which
/// rejects both reordering and repetition. Returns `None` on any mismatch.
fn scan_section<'a, const N: usize>(
    section: &'a str,
    designators: &[(u8, &'static str); N],
) -> Option<[Option<&'a str>; N]> {
    let mut groups = [None; N];
    let mut next = 0;
    let mut rest = section;

    while !rest.is_empty() {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        let (value, tail) = rest.split_at(digits);
        let designator = *tail.as_bytes().first()?;
        let index = next + designators[next..].iter().position(|(d, _)| *d == designator)?;

        groups[index] = Some(value);
        next = index + 1;
        // The designator is a single ASCII byte.
        rest = &tail[1..];
    }

    Some(groups)
}

fn field_value(group: Option<&str>, field: &'static str) -> Result<u32> {
    let Some(digits) = group else {
        return Ok(0);
    };
    // Digits only, so the value is never negative.
    digits
        .parse::<i32>()
        .map(|value| value.unsigned_abs())
        .map_err(|source| DatespanError::NumericOverflow {
            field,
            value: digits.to_string(),
            source,
        })
}

impl FromStr for Duration {
    type Err = DatespanError;

    fn from_str(s: &str) -> Result<Self> {
        parse_duration(s)
    }
}

/// Renders the canonical token: zero groups are omitted and `T` appears only
/// when the time component is non-zero. The zero duration renders as `"P"`.
impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("P")?;
        let date = [self.year, self.month, self.week, self.day];
        for (value, (designator, _)) in date.into_iter().zip(DATE_DESIGNATORS) {
            if value != 0 {
                write!(f, "{value}{}", designator as char)?;
            }
        }
        if self.is_time_zero() {
            return Ok(());
        }
        f.write_str("T")?;
        let time = [self.hour, self.minute, self.second];
        for (value, (designator, _)) in time.into_iter().zip(TIME_DESIGNATORS) {
            if value != 0 {
                write!(f, "{value}{}", designator as char)?;
            }
        }
        Ok(())
    }
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct Visitor;

        impl de::Visitor<'_> for Visitor {
            type Value = Duration;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an ISO 8601 duration string such as \"P1DT2H\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Duration, E> {
                parse_duration(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(Visitor)
    }
}
